/// Full match lifecycle: start gating, the round loop, submission wait and
/// final standings.
mod support;

use partydeck_ai::baseline::BaselineBot;
use partydeck_ai::Bot;
use partydeck_server::{MatchHandlers, Phase, ServerMessage, NOBODY};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use support::*;
use tokio::time::Instant;

#[tokio::test(start_paused = true)]
async fn three_player_single_round_match() {
    let questions = ["Q1"];
    let (handlers, ends) = count_ends(pick_nickname(MatchHandlers::new(), "P2"));
    let (handle, task) = spawn(&questions, answers(12), settings(Some(1)), handlers);

    let mut p1 = join(&handle, "P1").await;
    let mut p2 = join(&handle, "P2").await;
    let mut p3 = join(&handle, "P3").await;
    assert!(p1.player.is_admin());
    assert!(!p2.player.is_admin());

    let starter = handle.clone();
    let started = tokio::spawn(async move { starter.start().await });

    let mut p2_seen = until(&mut p2.rx, is_round_start).await;
    let round_start = p2_seen.last().expect("round start").clone();
    assert_eq!(
        round_start.message,
        ServerMessage::RoundStarted {
            question: "Q1".into(),
            judge: "P1".into(),
        }
    );
    assert_eq!(round_start.round, 1);
    assert_eq!(round_start.is_judge, Some(false));
    assert_eq!(round_start.hand.as_deref(), Some(p2.player.hand()));

    let p3_seen = until(&mut p3.rx, is_round_start).await;
    let submitted_at = Instant::now();
    let p2_card = p2.player.hand()[0].id;
    let p3_card = p3.player.hand()[0].id;
    let replacement = p2.player.submit(p2_card).await.expect("P2 submits");
    assert_ne!(replacement.id, p2_card);
    p3.player.submit(p3_card).await.expect("P3 submits");

    p2_seen.extend(until(&mut p2.rx, is_outcome).await);
    assert!(Instant::now() - submitted_at < Duration::from_secs(1));

    let scores = started.await.expect("start task").expect("match ran");
    let nicknames: Vec<&str> = scores.iter().map(|s| s.nickname.as_str()).collect();
    assert_eq!(nicknames, ["P2", "P1", "P3"]);
    assert_eq!(scores[0].wins, 1);
    let q1 = question_deck(&questions).draw_top().expect("Q1").id;
    assert_eq!(scores[0].cards_won, vec![q1]);
    assert_eq!(scores[1].wins, 0);
    assert_eq!(scores[2].wins, 0);

    let p1_seen = until_released(&mut p1.rx).await;
    assert_eq!(
        kinds(&p1_seen),
        [
            "promoted",
            "player_count",
            "player_count",
            "player_count",
            "started",
            "round_started",
            "picks",
            "outcome",
        ]
    );
    assert_eq!(p1_seen[4].round, 1);
    assert_eq!(p1_seen[5].is_judge, Some(true));
    assert_eq!(p1_seen[5].hand, None);

    let ServerMessage::Picks { picks } = &p1_seen[6].message else {
        panic!("expected picks, got {:?}", p1_seen[6].message);
    };
    let picked: Vec<_> = picks.iter().map(|p| (p.player_id.clone(), p.card_id)).collect();
    assert_eq!(
        picked,
        [
            (p2.player.id().clone(), p2_card),
            (p3.player.id().clone(), p3_card),
        ]
    );
    assert_eq!(
        p1_seen[7].message,
        ServerMessage::Outcome {
            winner: "P2".into(),
            winner_id: Some(p2.player.id().clone()),
        }
    );

    assert_eq!(kinds(&p3_seen), ["player_count", "started", "round_started"]);
    assert_eq!(task.await.expect("match task"), scores);
    assert_eq!(ends.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn start_with_two_players_is_a_no_op() {
    let fired = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&fired);
    let handlers = MatchHandlers::new().with_on_start(move |_roster| {
        let flag = Arc::clone(&flag);
        async move {
            flag.store(true, Ordering::SeqCst);
        }
    });
    let (handle, _task) = spawn(&["Q1"], answers(12), settings(None), handlers);

    let mut p1 = join(&handle, "P1").await;
    let mut p2 = join(&handle, "P2").await;
    drain(&mut p1.rx);
    drain(&mut p2.rx);

    let scores = handle.start().await.expect("match alive");
    assert!(scores.is_empty());
    p1.player.request_start().await.expect("match alive");

    let status = handle.status().await.expect("match alive");
    assert_eq!(status.phase, Phase::Pending);
    assert_eq!(status.players, 2);
    assert!(drain(&mut p1.rx).is_empty());
    assert!(drain(&mut p2.rx).is_empty());
    assert!(!fired.load(Ordering::SeqCst));
}

#[tokio::test(start_paused = true)]
async fn submission_wait_times_out_after_pick_timeout() {
    let (handle, task) = spawn(&["Q1"], answers(12), settings(None), MatchHandlers::new());
    let mut p1 = join(&handle, "P1").await;
    let _p2 = join(&handle, "P2").await;
    let _p3 = join(&handle, "P3").await;

    let starter = handle.clone();
    tokio::spawn(async move { starter.start().await });

    until(&mut p1.rx, is_round_start).await;
    let round_started_at = Instant::now();
    let picks = until(&mut p1.rx, is_picks).await;
    assert_eq!(Instant::now() - round_started_at, Duration::from_secs(30));
    assert_eq!(picks.last().map(|e| &e.message), Some(&ServerMessage::Picks { picks: vec![] }));

    let outcome = until(&mut p1.rx, is_outcome).await;
    assert_eq!(
        outcome.last().map(|e| &e.message),
        Some(&ServerMessage::Outcome {
            winner: NOBODY.into(),
            winner_id: None,
        })
    );

    let scores = task.await.expect("match task");
    assert_eq!(scores.len(), 3);
    assert!(scores.iter().all(|s| s.wins == 0));
}

#[tokio::test(start_paused = true)]
async fn player_can_start_the_match_and_judges_rotate() {
    let questions = ["Q1", "Q2", "Q3", "Q4"];
    let (handle, task) = spawn(&questions, answers(12), settings(None), MatchHandlers::new());
    let mut p1 = join(&handle, "P1").await;
    let _p2 = join(&handle, "P2").await;
    let p3 = join(&handle, "P3").await;

    p3.player.request_start().await.expect("match alive");

    let seen = until_released(&mut p1.rx).await;
    let judges: Vec<(usize, String)> = seen
        .iter()
        .filter_map(|e| match &e.message {
            ServerMessage::RoundStarted { judge, .. } => Some((e.round, judge.clone())),
            _ => None,
        })
        .collect();
    assert_eq!(
        judges,
        [
            (1, "P1".to_string()),
            (2, "P2".to_string()),
            (3, "P3".to_string()),
            (4, "P1".to_string()),
        ]
    );
    let outcome_rounds: Vec<usize> = seen
        .iter()
        .filter(|e| is_outcome(&e.message))
        .map(|e| e.round)
        .collect();
    assert_eq!(outcome_rounds, [1, 2, 3, 4]);
    assert_eq!(task.await.expect("match task").len(), 3);
}

#[tokio::test(start_paused = true)]
async fn second_start_while_running_returns_empty() {
    let (handle, task) = spawn(&["Q1"], answers(12), settings(None), MatchHandlers::new());
    let mut p1 = join(&handle, "P1").await;
    let _p2 = join(&handle, "P2").await;
    let _p3 = join(&handle, "P3").await;

    let starter = handle.clone();
    tokio::spawn(async move { starter.start().await });
    until(&mut p1.rx, is_round_start).await;

    assert!(handle.start().await.expect("match alive").is_empty());
    let status = handle.status().await.expect("match alive");
    assert_eq!(status.phase, Phase::Active);
    assert_eq!(status.round, 1);

    let late = partydeck_server::ChannelConnection::new().0;
    let err = handle
        .add_player("late", Arc::new(late))
        .await
        .unwrap_err();
    assert_eq!(err, partydeck_server::MatchError::AlreadyStarted);

    task.await.expect("match task");
    assert!(handle.is_closed());
}

#[tokio::test(start_paused = true)]
async fn bots_play_a_full_match() {
    let questions = ["Q1", "Q2", "Q3"];
    let judge = Arc::new(BaselineBot::new());
    let handlers = MatchHandlers::new().with_pick_winner(move |picks, _judge, _roster| {
        let judge = Arc::clone(&judge);
        async move { judge.choose_winner("", &picks) }
    });
    let (handle, task) = spawn(&questions, answers(20), settings(None), handlers);

    let mut seats = Vec::new();
    for nickname in ["P1", "P2", "P3"] {
        seats.push(join(&handle, nickname).await);
    }

    let mut bots = Vec::new();
    for mut seat in seats {
        bots.push(tokio::spawn(async move {
            let bot = BaselineBot::new();
            while let Some(envelope) = seat.rx.recv().await {
                if envelope.is_judge == Some(false) {
                    if let (ServerMessage::RoundStarted { question, .. }, Some(hand)) =
                        (&envelope.message, &envelope.hand)
                    {
                        if let Some(card) = bot.choose_card(question, hand) {
                            seat.player.submit(card).await.expect("submission accepted");
                        }
                    }
                }
            }
        }));
    }

    handle.start().await.expect("match ran");
    let scores = task.await.expect("match task");
    for bot in bots {
        bot.await.expect("bot finished");
    }

    assert_eq!(scores.iter().map(|s| s.wins).sum::<usize>(), 3);
    let won: usize = scores.iter().map(|s| s.cards_won.len()).sum();
    assert_eq!(won, 3);
}
