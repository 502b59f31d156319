use fogpath::*;

fn p(y: i32, x: i32) -> Pos {
    Pos { y, x }
}

fn map(text: &str) -> Graph {
    parse_map(text).expect("scenario map parses")
}

fn run(graph: &mut Graph, config: RunConfig) -> RunReport {
    Session::new(graph, config).expect("session starts").run(&mut NoopSink).expect("run completes")
}

#[test]
fn street_row_costs_two_with_a_single_path() {
    for algorithm in [SearchAlgorithm::Dijkstra, SearchAlgorithm::AStar] {
        let mut graph = map("@S*\n");
        let report = run(&mut graph, RunConfig { algorithm, ..RunConfig::default() });
        assert_eq!(
            report.outcome,
            RunOutcome::Reached {
                cost: 2,
                route: vec![p(0, 0), p(0, 1), p(0, 2)],
                final_paths: vec![vec![p(0, 0), p(0, 1), p(0, 2)]],
                truncated: false,
            },
            "{algorithm:?}"
        );
        assert!(report.legs.is_empty());
    }
}

#[test]
fn foggy_middle_column_is_explored_before_the_final_search() {
    for frontier_strategy in [
        FrontierStrategy::ClosestToPlayer,
        FrontierStrategy::ClosestToTarget,
        FrontierStrategy::MinSumOfBoth,
    ] {
        let mut graph = map("@sS\nSsS\nSs*\n");
        let report = run(&mut graph, RunConfig { frontier_strategy, ..RunConfig::default() });

        assert!(
            matches!(report.log.get(1), Some(RunEvent::SearchFailed { from, .. }) if *from == p(0, 0)),
            "first search must fail under {frontier_strategy:?}"
        );
        let Some(RunEvent::EntrySelected { frontier, entry, .. }) =
            report.log.iter().find(|event| matches!(event, RunEvent::EntrySelected { .. }))
        else {
            panic!("an entry must be selected under {frontier_strategy:?}");
        };
        assert!(frontier.x == 0 || frontier.x == 2);
        assert_eq!(entry.x, 1);

        let reached_far_column = report.legs.iter().any(|leg| {
            matches!(leg, Leg::Excursion(excursion) if excursion.end.exit().is_some_and(|pos| pos.x == 2))
        });
        assert!(reached_far_column, "{frontier_strategy:?}");
        assert_eq!(report.outcome.cost(), Some(4), "{frontier_strategy:?}");
    }
}

#[test]
fn twin_routes_yield_exactly_two_paths() {
    for algorithm in [SearchAlgorithm::Dijkstra, SearchAlgorithm::AStar] {
        let mut graph = map("@S\nS*\n");
        let report = run(&mut graph, RunConfig { algorithm, ..RunConfig::default() });
        let RunOutcome::Reached { cost, final_paths, .. } = report.outcome else {
            panic!("twin routes are fully visible");
        };
        assert_eq!(cost, 2);
        assert_eq!(
            final_paths,
            vec![vec![p(0, 0), p(0, 1), p(1, 1)], vec![p(0, 0), p(1, 0), p(1, 1)]],
            "{algorithm:?}"
        );
    }
}

#[test]
fn mountain_locked_target_fails_without_exploring() {
    let mut graph = map("@SSSS\nSSMMM\nSSM*M\nSSMMM\n");
    let mut steps = Vec::new();
    let report = Session::new(&mut graph, RunConfig::default())
        .expect("session starts")
        .run(&mut steps)
        .expect("run completes");

    assert_eq!(report.outcome, RunOutcome::Unreachable { ambiguous_frontier: Vec::new() });
    assert!(report.legs.is_empty());
    assert!(!report.log.iter().any(|event| matches!(event, RunEvent::EntrySelected { .. })));
    assert!(!steps.iter().any(|step| matches!(step.label, Some(StepLabel::FogEntered { .. }))));
}

#[test]
fn edge_weighting_charges_edge_costs() {
    let mut graph = map("@S*\n");
    assert!(graph.set_edge_cost(p(0, 0), Direction::East, 5));
    let report = run(&mut graph, RunConfig { weighting: Weighting::Edge, ..RunConfig::default() });
    assert_eq!(report.outcome.cost(), Some(6));

    let mut graph = map("@S*\n");
    graph.set_edge_cost(p(0, 0), Direction::East, 5);
    let report = run(&mut graph, RunConfig::default());
    assert_eq!(report.outcome.cost(), Some(2));
}

#[test]
fn path_cap_marks_the_outcome_truncated() {
    let mut graph = map("@SS\nSSS\nSS*\n");
    let report = run(&mut graph, RunConfig { max_paths: Some(3), ..RunConfig::default() });
    let RunOutcome::Reached { final_paths, truncated, .. } = report.outcome else {
        panic!("open room is fully visible");
    };
    assert_eq!(final_paths.len(), 3);
    assert!(truncated);
}

#[test]
fn removed_rows_and_columns_reroute_the_search() {
    let mut graph = map("@SS\nSSS\nSS*\n");
    graph.remove_row(1);
    let report = run(&mut graph, RunConfig::default());
    assert_eq!(report.outcome, RunOutcome::Unreachable { ambiguous_frontier: Vec::new() });

    let mut graph = map("@SS\nSSS\nSS*\n");
    graph.remove_column(1);
    let report = run(&mut graph, RunConfig::default());
    assert!(matches!(report.outcome, RunOutcome::Unreachable { .. }));

    let mut graph = map("@HS\nSHS\nSS*\n");
    graph.remove_node(p(2, 1));
    let report = run(&mut graph, RunConfig::default());
    assert_eq!(report.outcome.cost(), Some(8));
}
