//! Demo of a replay session
//!
//! Demonstrates:
//! - Performing actions on drafts
//! - Printing each frame the way a visualiser would show it
//! - Committing drafts, including one that grows the table
//! - Encoding the committed table and reading it back

use probeset_core::{ProbeStrategy, TableConfig};
use probeset_trace::{decode_snapshot, encode_snapshot, Action, Session};

fn main() -> probeset_trace::Result<()> {
    env_logger::init();

    println!("=== probeset replay demo ===\n");

    let mut session = Session::new(TableConfig::default(), ProbeStrategy::Linear)?;

    let script = [
        (Action::Insert, 10),
        (Action::Insert, 17),
        (Action::Insert, 1),
        (Action::Insert, 2),
        (Action::Search, 17),
        (Action::Delete, 10),
        (Action::Search, 10),
        (Action::Insert, 17),
    ];

    for (action, key) in script {
        let replay = session.perform(action, key)?;
        println!("{} {} ({})", action, key, replay.strategy());
        for frame in replay.frames() {
            println!("  {}", frame);
        }

        let changed = session.commit(replay)?;
        println!("  -> committed (changed: {}), {}\n", changed, session.stats());
    }

    let bytes = encode_snapshot(session.table());
    println!("Snapshot: {} bytes", bytes.len());

    let restored = decode_snapshot(&bytes)?;
    println!(
        "Restored table identical: {} (fingerprint {:?})",
        restored.is_identical(session.table()),
        restored.fingerprint()
    );

    println!("\nSwitching to quadratic probing clears the table");
    session.set_strategy(ProbeStrategy::Quadratic);
    println!("  {}", session.stats());

    Ok(())
}
