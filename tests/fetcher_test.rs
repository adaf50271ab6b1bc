mod common;

use common::*;
use soccer_monitor::*;

const DATASET_SE_LINE: &str =
    "SE,69,10632029737813340,27679,-221,1011,553570,2481132,-9441,2048,2580,-8913,1107,4396";

#[test]
fn test_dataset_event_parsing_with_split() {
    let event = parse_event_line(DATASET_SE_LINE).expect("line should parse");
    assert_eq!(
        event,
        Event::Position(PositionEvent::new(69, 10632029737813340, 27679, -221, 1011))
    );
}

#[test]
fn test_dataset_event_parsing_with_regex() {
    let event = parse_event_line_regex(DATASET_SE_LINE).expect("line should parse");
    assert_eq!(
        event,
        Event::Position(PositionEvent::new(69, 10632029737813340, 27679, -221, 1011))
    );
}

#[test]
fn test_parsing_strategies_agree() {
    let lines = [
        DATASET_SE_LINE,
        "SE,19,10633811911716270,26416,-6156,258,141603,523633,7167,1041,6895,3463,-7555,5560",
        "GI,2010,Game Interruption Begin,0,12398000000000000,0,First Half",
        "GI,2011,Game Interruption End,00:27:21.241,12422000000000000,0,First Half",
        "GI,6014,Game Interruption Begin,0,13086000000000000,0,Second Half",
        "GI,6015,Game Interruption End,0,13087000000000000,0,Second Half",
    ];
    for line in lines {
        let split = parse_event_line(line).expect("split strategy should parse");
        let regex = parse_event_line_regex(line).expect("regex strategy should parse");
        assert_eq!(split, regex, "strategies disagree on {line:?}");
    }
}

#[test]
fn test_interruption_and_resume_ids() {
    for (id, expect_interruption) in [(2010, true), (2011, false), (6014, true), (6015, false)] {
        let line = format!("GI,{id},Whistle,0,12398000000000001,0,Half");
        match parse_event_line(&line).expect("line should parse") {
            Event::Interruption(e) => {
                assert!(expect_interruption, "id {id} should not interrupt");
                assert_eq!(e.timestamp, 12398000000000001);
            }
            Event::Resume(e) => {
                assert!(!expect_interruption, "id {id} should interrupt");
                assert_eq!(e.timestamp, 12398000000000001);
            }
            other => panic!("unexpected event {other:?}"),
        }
    }
}

#[test]
fn test_unknown_interruption_id_fails() {
    let err = parse_event_line("GI,9999,Whistle,0,12398000000000001,0,Half").unwrap_err();
    assert!(matches!(
        err.variant,
        MonitorErrorVariant::UnknownInterruptionId(9999)
    ));
}

#[test]
fn test_unknown_line_fails() {
    for line in ["bogus", "SX,1,2,3,4,5", "SE,not,numeric,1,2,3", ""] {
        let err = parse_event_line(line).unwrap_err();
        assert!(
            matches!(err.variant, MonitorErrorVariant::UnknownLine(_)),
            "expected UnknownLine for {line:?}"
        );
    }
}

#[test]
fn test_position_event_round_trip() {
    let event = PositionEvent::new(69, 10632029737813340, 27679, -221, 1011);
    let line = event.to_string();
    assert_eq!(parse_event_line(&line).unwrap(), Event::Position(event));
    assert_eq!(parse_event_line_regex(&line).unwrap(), Event::Position(event));
}

#[test]
fn test_game_phase_intervals_are_closed() {
    assert_eq!(GamePhase::of(GAME_START - 1), GamePhase::PreMatch);
    assert_eq!(GamePhase::of(GAME_START), GamePhase::InPlay);
    assert_eq!(GamePhase::of(BREAK_START), GamePhase::InPlay);
    assert_eq!(GamePhase::of(BREAK_START + 1), GamePhase::Break);
    assert_eq!(GamePhase::of(BREAK_END - 1), GamePhase::Break);
    assert_eq!(GamePhase::of(BREAK_END), GamePhase::InPlay);
    assert_eq!(GamePhase::of(GAME_END), GamePhase::InPlay);
    assert_eq!(GamePhase::of(GAME_END + 1), GamePhase::PostMatch);
}

#[test]
fn test_pre_game_events_never_reach_a_batch() {
    let stream: String = (0..5)
        .map(|i| se_line(13, GAME_START - 1000 + i, 100 * i as i32, 0, 0) + "\n")
        .collect();
    let mut fetcher = EventFetcher::from_dataset(&stream, 60, 10, test_context());

    let batch = fetcher.next_batch().unwrap().expect("final batch expected");
    assert!(batch.data.is_empty());
    assert!(batch.is_period_last);
    assert!(fetcher.next_batch().unwrap().is_none());

    // The warm-up events still reached the field state.
    let position = fetcher.context().position(13).expect("sensor 13 known");
    assert_eq!(position.vector().x, 100.0);
}

#[test]
fn test_period_boundary_carries_the_triggering_event() {
    let e1 = position_event(13, in_game_ts(0.5), 100, 0, 0);
    let e2 = position_event(13, in_game_ts(1.5), 200, 0, 0);
    let stream = format!(
        "{}\n{}\n",
        se_line(13, e1.timestamp, e1.x, e1.y, e1.z),
        se_line(13, e2.timestamp, e2.x, e2.y, e2.z)
    );
    let mut fetcher = EventFetcher::from_dataset(&stream, 1, 10, test_context());
    let batches = drain(&mut fetcher);

    assert_eq!(batches.len(), 2);
    assert_eq!(batches[0].data, vec![e1]);
    assert!(batches[0].is_period_last);
    // The boundary event belongs to the next period and arrives with the
    // next batch.
    assert_eq!(batches[1].data, vec![e2]);
    assert!(batches[1].is_period_last);
    assert!(batches[0].final_ts <= batches[1].initial_ts);
}

#[test]
fn test_full_batch_is_emitted_without_closing_the_period() {
    let events: Vec<PositionEvent> = (0..3)
        .map(|i| position_event(13, in_game_ts(0.1 * (i + 1) as f64), i, 0, 0))
        .collect();
    let stream: String = events
        .iter()
        .map(|e| se_line(e.sid, e.timestamp, e.x, e.y, e.z) + "\n")
        .collect();
    let mut fetcher = EventFetcher::from_dataset(&stream, 3600, 2, test_context());
    let batches = drain(&mut fetcher);

    assert_eq!(batches.len(), 2);
    assert_eq!(batches[0].data, vec![events[0], events[1]]);
    assert!(!batches[0].is_period_last);
    assert_eq!(batches[1].data, vec![events[2]]);
    assert!(batches[1].is_period_last);
}

#[test]
fn test_interruption_flushes_and_suppresses_events() {
    let e1 = position_event(13, in_game_ts(1.0), 100, 0, 0);
    let paused = [
        position_event(13, in_game_ts(2.0), 300, 0, 0),
        position_event(47, in_game_ts(2.1), 400, 0, 0),
        position_event(4, in_game_ts(2.2), 500, 0, 0),
    ];
    let mut stream = se_line(e1.sid, e1.timestamp, e1.x, e1.y, e1.z) + "\n";
    stream += &format!("GI,2010,Game Interruption Begin,0,{},0,Half\n", in_game_ts(1.5));
    for e in &paused {
        stream += &(se_line(e.sid, e.timestamp, e.x, e.y, e.z) + "\n");
    }
    stream += &format!("GI,2011,Game Interruption End,0,{},0,Half\n", in_game_ts(2.5));

    let mut fetcher = EventFetcher::from_dataset(&stream, 3600, 10, test_context());
    let batches = drain(&mut fetcher);

    // The open batch is flushed by the first paused event; none of the
    // paused events ever show up in a batch.
    let all_events: Vec<PositionEvent> = batches.iter().flat_map(|b| b.data.clone()).collect();
    assert_eq!(all_events, vec![e1]);

    // The context still followed every paused update.
    let context = fetcher.context();
    assert_eq!(context.position(47).unwrap().vector().x, 200.0);
    // The paused ball report landed inside the field and became the game
    // ball.
    assert_eq!(
        context.position(4).unwrap().vector(),
        glam::DVec3::new(500.0, 0.0, 0.0)
    );
}

#[test]
fn test_break_events_update_positions_but_never_batch() {
    let e1 = position_event(13, BREAK_START, 100, 0, 0);
    let break_event = position_event(47, BREAK_START + PICOS_PER_SECOND, 900, 100, 0);
    let stream = format!(
        "{}\n{}\n",
        se_line(e1.sid, e1.timestamp, e1.x, e1.y, e1.z),
        se_line(
            break_event.sid,
            break_event.timestamp,
            break_event.x,
            break_event.y,
            break_event.z
        )
    );
    let mut fetcher = EventFetcher::from_dataset(&stream, 3600, 10, test_context());
    let batches = drain(&mut fetcher);

    // An event exactly at the break start is still in play; the first event
    // inside the break closes the period.
    assert_eq!(batches[0].data, vec![e1]);
    assert!(batches[0].is_period_last);
    let all_events: Vec<PositionEvent> = batches.iter().flat_map(|b| b.data.clone()).collect();
    assert_eq!(all_events, vec![e1]);

    let position = fetcher.context().position(47).unwrap();
    assert_eq!(position.vector().x, 450.0);
}

#[test]
fn test_snapshot_reflects_state_before_first_batch_event() {
    // A warm-up event positions sensor 13 before the game; the first batch's
    // snapshot must see it, but not the in-batch update that follows.
    let stream = format!(
        "{}\n{}\n{}\n",
        se_line(13, GAME_START - 1, 400, 400, 400),
        se_line(13, in_game_ts(1.0), 800, 0, 0),
        se_line(14, in_game_ts(2.0), 800, 0, 0),
    );
    let mut fetcher = EventFetcher::from_dataset(&stream, 3600, 10, test_context());
    let batches = drain(&mut fetcher);

    assert_eq!(batches.len(), 1);
    let snapshot_position = &batches[0].snapshot["Nick Gertje"];
    // Mean over the four worn sensors, only sensor 13 away from the origin.
    assert_eq!(snapshot_position.vector().x, 100.0);
    assert_eq!(snapshot_position.vector().y, 100.0);

    // The live context has long since moved on.
    let live = fetcher.context().position(13).unwrap();
    assert_eq!(live.vector().x, 400.0);
}

#[test]
fn test_unregistered_sensors_are_dropped() {
    // Sensor 1000 belongs to nobody (a referee, say).
    let stream = format!(
        "{}\n{}\n",
        se_line(1000, in_game_ts(1.0), 1, 2, 3),
        se_line(13, in_game_ts(2.0), 100, 0, 0),
    );
    let mut fetcher = EventFetcher::from_dataset(&stream, 3600, 10, test_context());
    let batches = drain(&mut fetcher);
    let all_events: Vec<PositionEvent> = batches.iter().flat_map(|b| b.data.clone()).collect();
    assert_eq!(all_events.len(), 1);
    assert_eq!(all_events[0].sid, 13);
}

#[test]
fn test_batch_timestamps_bound_their_events() {
    let stream: String = (0..25)
        .map(|i| se_line(13, in_game_ts(0.9 * (i + 1) as f64), i, 0, 0) + "\n")
        .collect();
    let mut fetcher = EventFetcher::from_dataset(&stream, 4, 7, test_context());
    let batches = drain(&mut fetcher);

    for batch in &batches {
        for event in &batch.data {
            assert!(batch.initial_ts <= event.timestamp);
            assert!(event.timestamp <= batch.final_ts);
        }
    }
    for pair in batches.windows(2) {
        assert!(pair[0].final_ts <= pair[1].initial_ts);
    }
}

#[test]
fn test_parse_failure_aborts_the_sequence() {
    let stream = format!("{}\nnot an event\n", se_line(13, in_game_ts(1.0), 1, 2, 3));
    let mut fetcher = EventFetcher::from_dataset(&stream, 3600, 10, test_context());
    assert!(fetcher.next_batch().is_err());
}
