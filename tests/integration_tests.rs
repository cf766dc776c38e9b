use std::fs;
use std::path::Path;
use std::sync::Arc;

use f1_teammates::analyzers::aggregate::{MINIMUM_SESSION_THRESHOLD, aggregate_outcomes};
use f1_teammates::analyzers::rank::rank_drivers;
use f1_teammates::curation::ExclusionList;
use f1_teammates::error::AggregationError;
use f1_teammates::session::SessionKind;
use f1_teammates::sources::SessionLoader;
use f1_teammates::sources::csv_dir::CsvDirSource;

const ROUNDS: u32 = 11;
const HEADER: &str = "driver_number,abbreviation,full_name,team_name,position,status,q1,q2,q3\n";

fn write(path: &Path, content: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// Two seasons of qualifying with 11 rounds each. Round 5 of 2018 is the
/// Russian Grand Prix (a known-corrupted qualifying session) and round 7 of
/// 2019 has no results file.
fn build_corpus(root: &Path, hamilton_alias_round: Option<u32>) -> CsvDirSource {
    let source = CsvDirSource::new(root);

    for year in [2018, 2019] {
        let mut schedule = String::from("round,event_name,date\n");
        schedule.push_str("0,Pre-Season Testing,\n");
        for round in 1..=ROUNDS {
            let name = if year == 2018 && round == 5 {
                "Russian Grand Prix".to_string()
            } else {
                format!("Grand Prix {round}")
            };
            schedule.push_str(&format!("{round},{name},\n"));

            if year == 2019 && round == 7 {
                continue;
            }

            let (ver, per) = if year == 2018 && round == 5 { (10, 1) } else { (1, 4) };
            let hamilton = if year == 2019 && Some(round) == hamilton_alias_round {
                "L. Hamilton"
            } else {
                "Lewis Hamilton"
            };
            let rows = format!(
                "{HEADER}\
                 33,VER,Max Verstappen,Red Bull,{ver},,1:30.000,,\n\
                 11,PER,Sergio Perez,Red Bull,{per},,1:31.000,,\n\
                 44,HAM,{hamilton},Mercedes,2,,1:30.500,,\n\
                 77,BOT,Valtteri Bottas,Mercedes,3,,1:30.700,,\n\
                 20,MAG,Kevin Magnussen,Haas,5,,1:32.000,,\n"
            );
            write(&source.session_path(year, round, SessionKind::Qualifying), &rows);
        }
        write(&source.schedule_path(year), &schedule);
    }

    source
}

#[tokio::test]
async fn test_full_pipeline_over_csv_corpus() {
    let dir = tempfile::tempdir().unwrap();
    let source = build_corpus(dir.path(), None);

    let loader = SessionLoader::new(Arc::new(source), vec![SessionKind::Qualifying])
        .with_concurrency(3);
    let outcomes = loader.load_for_years(2018..=2019).await;
    assert_eq!(outcomes.len(), 22);

    let report = aggregate_outcomes(
        outcomes,
        ExclusionList::known_corrupted(),
        MINIMUM_SESSION_THRESHOLD,
    )
    .unwrap();

    assert_eq!(report.sessions_excluded, 1);
    assert_eq!(report.error_count(), 1);
    assert_eq!(report.sessions_folded, 20);
    assert!(!report.drivers.contains_key("MAG"));

    let ranked = rank_drivers(&report.drivers);
    let order: Vec<_> = ranked.iter().map(|d| d.abbreviation.as_str()).collect();
    assert_eq!(order, vec!["VER", "HAM", "BOT", "PER"]);

    assert_eq!(ranked[0].avg_teammate_delta, 3.0);
    assert_eq!(ranked[0].num_sessions, 20);
    assert_eq!(ranked[0].name, "Max Verstappen");
    assert_eq!(ranked[3].avg_teammate_delta, -3.0);
}

#[tokio::test]
async fn test_threshold_drops_short_careers() {
    let dir = tempfile::tempdir().unwrap();
    let source = build_corpus(dir.path(), None);

    let loader = SessionLoader::new(Arc::new(source), vec![SessionKind::Qualifying]);
    let outcomes = loader.load_for_years(2018..=2019).await;

    // Everyone has exactly 20 sessions.
    let report = aggregate_outcomes(outcomes, ExclusionList::known_corrupted(), 20).unwrap();
    assert!(report.drivers.is_empty());
}

#[tokio::test]
async fn test_identity_collision_aborts_run() {
    let dir = tempfile::tempdir().unwrap();
    let source = build_corpus(dir.path(), Some(3));

    let loader = SessionLoader::new(Arc::new(source), vec![SessionKind::Qualifying]);
    let outcomes = loader.load_for_years(2018..=2019).await;

    let err = aggregate_outcomes(outcomes, ExclusionList::known_corrupted(), 0).unwrap_err();
    let AggregationError::IdentityCollision {
        abbreviation,
        existing,
        found,
    } = err;
    assert_eq!(abbreviation, "HAM");
    assert_eq!(existing, "Lewis Hamilton");
    assert_eq!(found, "L. Hamilton");
}

#[tokio::test]
async fn test_excluded_session_changes_nothing_when_rules_are_dropped() {
    let dir = tempfile::tempdir().unwrap();
    let source = build_corpus(dir.path(), None);

    let loader = SessionLoader::new(Arc::new(source), vec![SessionKind::Qualifying]);
    let outcomes = loader.load_for_years(2018..=2019).await;

    // Without curation the Russian session is folded and drags VER's average down.
    let report = aggregate_outcomes(outcomes, ExclusionList::empty(), 0).unwrap();
    assert_eq!(report.sessions_excluded, 0);
    assert_eq!(report.drivers["VER"].num_sessions, 21);
    assert!(report.drivers["VER"].avg_teammate_delta < 3.0);
}

/// One 2020 season whose Emilia Romagna qualifying repeats driver #5, the way
/// the real corrupted session does.
fn build_duplicate_number_corpus(root: &Path) -> CsvDirSource {
    let source = CsvDirSource::new(root);
    let names = ["Austrian Grand Prix", "Emilia Romagna Grand Prix", "Turkish Grand Prix"];

    let mut schedule = String::from("round,event_name,date\n");
    for (i, name) in names.iter().enumerate() {
        let round = i as u32 + 1;
        schedule.push_str(&format!("{round},{name},\n"));

        let mut rows = format!(
            "{HEADER}\
             5,VET,Sebastian Vettel,Ferrari,3,,1:30.000,,\n\
             16,LEC,Charles Leclerc,Ferrari,1,,1:29.500,,\n"
        );
        if round == 2 {
            rows.push_str("5,VET,Sebastian Vettel,Ferrari,2,,1:29.900,,\n");
        }
        write(&source.session_path(2020, round, SessionKind::Qualifying), &rows);
    }
    write(&source.schedule_path(2020), &schedule);

    source
}

#[tokio::test]
async fn test_corrupted_session_is_excluded_before_loading() {
    let dir = tempfile::tempdir().unwrap();
    let source = Arc::new(build_duplicate_number_corpus(dir.path()));

    let loader = SessionLoader::new(source.clone(), vec![SessionKind::Qualifying])
        .with_exclusions(ExclusionList::known_corrupted());
    let outcomes = loader.load_for_years([2020]).await;

    let report = aggregate_outcomes(outcomes, ExclusionList::known_corrupted(), 0).unwrap();
    assert_eq!(report.sessions_excluded, 1);
    assert_eq!(report.error_count(), 0);
    assert_eq!(report.sessions_folded, 2);
    assert_eq!(report.drivers["LEC"].avg_teammate_delta, 2.0);

    // Without the rules the duplicate number surfaces as a load error.
    let loader = SessionLoader::new(source, vec![SessionKind::Qualifying]);
    let outcomes = loader.load_for_years([2020]).await;
    let report = aggregate_outcomes(outcomes, ExclusionList::empty(), 0).unwrap();
    assert_eq!(report.sessions_excluded, 0);
    assert_eq!(report.error_count(), 1);
    assert!(report.skipped[0].reason.contains("#5"));
}
