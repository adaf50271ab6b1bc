#![allow(dead_code)]

use soccer_monitor::*;

/// Metadata for a small four-player match with two ball sensors, in the
/// format of the dataset's metadata file.
pub const METADATA: &str = "\
PLAYER,A,Nick Gertje,13,14,97,98
PLAYER,A,Dennis Dotterweich,47,16,0,0
PLAYER,B,Ben Mueller,88,19,0,0
PLAYER,B,Vale Reitstetter,63,64,0,0
BALL,1,4
BALL,1,8
";

pub fn test_context() -> Context {
    Context::from_metadata(parse_metadata(METADATA))
}

/// Timestamp `seconds` after kick-off.
pub fn in_game_ts(seconds: f64) -> u64 {
    GAME_START + (seconds * PICOS_PER_SECOND as f64) as u64
}

/// A dataset stream line for a position event, with the trailing velocity
/// and acceleration fields the parser ignores.
pub fn se_line(sid: u32, ts: u64, x: i32, y: i32, z: i32) -> String {
    format!("SE,{sid},{ts},{x},{y},{z},553570,2481132,-9441,2048,2580,-8913,1107,4396")
}

pub fn position_event(sid: u32, ts: u64, x: i32, y: i32, z: i32) -> PositionEvent {
    PositionEvent::new(sid, ts, x, y, z)
}

/// Collects every remaining batch, panicking on parse failures.
pub fn drain<R: std::io::BufRead>(fetcher: &mut EventFetcher<R>) -> Vec<Batch> {
    fetcher
        .batches()
        .collect::<Result<Vec<_>, _>>()
        .expect("stream should parse")
}
