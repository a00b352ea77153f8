mod fake;

use ballista_engine::collect::{PigmentCollector, MAX_PICK, MIN_PICK};
use ballista_engine::shutdown::{self, Shutdown};
use fake::FakeRemote;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::time::Duration;
use test_log::test;

#[test(tokio::test(start_paused = true))]
async fn test_round_picks_generated_tick() {
    let remote = FakeRemote::new(200);
    let mut collector =
        PigmentCollector::new(&remote, ChaCha8Rng::seed_from_u64(0), Shutdown::never());
    let num = collector.round().await.unwrap();
    assert!((MIN_PICK..=MAX_PICK).contains(&num));
    assert_eq!(*remote.picks.borrow(), vec![(num, 101)]);
    assert_eq!(collector.stats().rounds, 1);
    assert_eq!(collector.stats().picked, num as u64);
}

#[test(tokio::test(start_paused = true))]
async fn test_runs_until_shutdown() {
    let (handle, shutdown) = shutdown::channel();
    let mut remote = FakeRemote::new(200);
    remote.stop_after_rounds = Some((25, handle));
    let collector = PigmentCollector::new(&remote, ChaCha8Rng::seed_from_u64(7), shutdown);
    let stats = collector.run().await.unwrap();
    assert_eq!(stats.rounds, 25);
    let picks = remote.picks.borrow();
    assert_eq!(picks.len(), 25);
    assert_eq!(stats.picked, picks.iter().map(|(num, _)| *num as u64).sum::<u64>());
    assert!(picks
        .iter()
        .all(|(num, _)| (MIN_PICK..=MAX_PICK).contains(num)));
    let ticks: Vec<i64> = picks.iter().map(|(_, tick)| *tick).collect();
    assert_eq!(ticks, (101..126).collect::<Vec<_>>());
}

#[test(tokio::test(start_paused = true))]
async fn test_pause_is_interrupted() {
    let (handle, shutdown) = shutdown::channel();
    let remote = FakeRemote::new(200);
    let collector = PigmentCollector::new(&remote, ChaCha8Rng::seed_from_u64(1), shutdown)
        .with_pause(Duration::from_secs(60));
    let stop = async {
        tokio::time::sleep(Duration::from_secs(90)).await;
        handle.trigger();
    };
    let (stats, ()) = tokio::join!(collector.run(), stop);
    assert_eq!(stats.unwrap().rounds, 2);
}

#[test(tokio::test(start_paused = true))]
async fn test_transport_error_stops_collector() {
    let remote = FakeRemote::new(200);
    remote.transport_down.set(true);
    let collector = PigmentCollector::new(&remote, ChaCha8Rng::seed_from_u64(0), Shutdown::never());
    assert!(collector.run().await.is_err());
}
