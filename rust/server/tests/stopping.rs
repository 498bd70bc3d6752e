/// Cooperative stop: requested by any player or by the host, honored only
/// once the round in progress has finished.
mod support;

use partydeck_server::{Envelope, MatchHandlers, ServerMessage, NOBODY};
use std::sync::atomic::Ordering;
use std::time::Duration;
use support::*;
use tokio::time::Instant;

fn outcomes(seen: &[Envelope]) -> Vec<&Envelope> {
    seen.iter().filter(|e| is_outcome(&e.message)).collect()
}

#[tokio::test(start_paused = true)]
async fn any_player_can_stop_the_match_mid_round() {
    let (handlers, ends) = count_ends(pick_nickname(MatchHandlers::new(), "P3"));
    let (handle, task) = spawn(&["Q1", "Q2", "Q3"], answers(12), settings(None), handlers);
    let mut p1 = join(&handle, "P1").await;
    let mut p2 = join(&handle, "P2").await;
    let mut p3 = join(&handle, "P3").await;
    assert!(!p2.player.is_admin());

    let starter = handle.clone();
    let started = tokio::spawn(async move { starter.start().await });
    until(&mut p2.rx, is_round_start).await;

    p2.player.request_stop().await.expect("match alive");
    let status = handle.status().await.expect("match alive");
    assert!(status.stop_requested);
    assert_eq!(status.round, 1);

    p2.player.submit(p2.player.hand()[0].id).await.expect("P2 submits");
    p3.player.submit(p3.player.hand()[0].id).await.expect("P3 submits");

    let scores = started.await.expect("start task").expect("match ran");
    assert_eq!(task.await.expect("match task"), scores);
    assert_eq!(scores[0].nickname, "P3");
    assert_eq!(scores[0].wins, 1);

    let p1_seen = until_released(&mut p1.rx).await;
    let finished = outcomes(&p1_seen);
    assert_eq!(finished.len(), 1);
    assert_eq!(finished[0].round, 1);
    assert!(!p1_seen.iter().any(|e| e.round == 2));

    until_released(&mut p2.rx).await;
    until_released(&mut p3.rx).await;
    assert_eq!(ends.load(Ordering::SeqCst), 1);
    assert!(handle.is_closed());
}

#[tokio::test(start_paused = true)]
async fn host_stop_waits_for_the_pick_window() {
    let (handlers, ends) = count_ends(MatchHandlers::new());
    let (handle, task) = spawn(&["Q1", "Q2", "Q3"], answers(12), settings(None), handlers);
    let mut p1 = join(&handle, "P1").await;
    let mut p2 = join(&handle, "P2").await;
    let mut p3 = join(&handle, "P3").await;

    let starter = handle.clone();
    let started = tokio::spawn(async move { starter.start().await });
    until(&mut p1.rx, is_round_start).await;

    let stopped_at = Instant::now();
    handle.stop().await.expect("match alive");
    assert!(handle.status().await.expect("match alive").stop_requested);

    let seen = until(&mut p1.rx, is_outcome).await;
    let waited = stopped_at.elapsed();
    assert!(waited >= Duration::from_secs(30), "stopped early after {:?}", waited);
    assert!(waited < Duration::from_secs(35));
    let last = seen.last().expect("outcome");
    assert_eq!(last.round, 1);
    assert_eq!(
        last.message,
        ServerMessage::Outcome {
            winner: NOBODY.to_string(),
            winner_id: None,
        }
    );

    let scores = started.await.expect("start task").expect("match ran");
    assert_eq!(scores.len(), 3);
    assert!(scores.iter().all(|s| s.wins == 0));
    assert_eq!(task.await.expect("match task"), scores);

    assert!(outcomes(&until_released(&mut p1.rx).await).is_empty());
    assert_eq!(outcomes(&until_released(&mut p2.rx).await).len(), 1);
    assert_eq!(outcomes(&until_released(&mut p3.rx).await).len(), 1);
    assert_eq!(ends.load(Ordering::SeqCst), 1);
}
