//! Day and vote scenarios played against the synchronous engine.
//!
//! These drive `Game` directly: nominations, the voting protocol, outcomes
//! against the day's about-to-die, and seating invariants.

use proptest::prelude::*;

use townsquare::characters::RoleKind;
use townsquare::core::UserId;
use townsquare::vote::majority_for;
use townsquare::{AbilityRef, Game, NextStep, NominationOutcome, Operator, ValidationError, VoteId, VoteOutcome};

fn id(n: u64) -> UserId {
    UserId::new(n)
}

fn seated(roles: &[RoleKind]) -> Game {
    let mut builder = Game::builder();
    for (i, role) in roles.iter().enumerate() {
        builder = builder.player(id(i as u64 + 1), *role);
    }
    builder.build().unwrap()
}

fn open_day(roles: &[RoleKind]) -> Game {
    let mut game = seated(roles);
    game.start_day(&[]).unwrap();
    game.open_noms().unwrap();
    game
}

fn nominate(game: &mut Game, nominee: u64, nominator: u64) -> VoteId {
    match game.nominate(Some(id(nominee)), Some(id(nominator))).unwrap() {
        NominationOutcome::Started(vote) => vote,
        NominationOutcome::Blocked => panic!("nomination blocked"),
    }
}

/// Play the vote out. Anyone not listed votes no.
fn play(game: &mut Game, yes: &[u64]) -> Option<VoteOutcome> {
    let mut outcome = None;
    loop {
        outcome = match game.next_step() {
            NextStep::Finished => return outcome,
            NextStep::Preset { vote, voter, yes, .. } => game.cast_vote(vote, voter, yes, Operator::Preset),
            NextStep::Barred { vote, voter, .. } => game.cast_vote(vote, voter, false, Operator::Auto),
            NextStep::Prompt { vote, voter, .. } => {
                game.cast_vote(vote, voter, yes.contains(&voter.raw()), Operator::Voter)
            }
        }
        .unwrap();
    }
}

// =============================================================================
// Nomination scenarios
// =============================================================================

/// Eight seats, seat 6 dead: seven living voters need four.
/// Nominee is seat 1, nominator seat 2, so voting starts at seat 2.
fn scenario() -> Game {
    let mut game = open_day(&[RoleKind::Chef; 8]);
    game.kill(id(6), false, false).unwrap();
    game
}

#[test]
fn test_short_of_majority_fails() {
    let mut game = scenario();
    let vote = nominate(&mut game, 1, 2);
    assert_eq!(game.current_vote().unwrap().majority(), 4);
    assert_eq!(
        game.current_vote().unwrap().order(),
        &[id(2), id(3), id(4), id(5), id(6), id(7), id(8), id(1)]
    );

    // 3 and 4 yes, 5 no, the dead 6 spends their vote on yes.
    assert_eq!(play(&mut game, &[3, 4, 6]), Some(VoteOutcome::Failed));

    let day = game.current_day().unwrap();
    assert_eq!(day.vote(vote).unwrap().votes(), 3);
    assert!(day.about_to_die().is_none());
    assert_eq!(game.player(id(6)).unwrap().dead_votes(), 0);
}

#[test]
fn test_majority_puts_nominee_on_the_block() {
    let mut game = scenario();
    let vote = nominate(&mut game, 1, 2);

    assert_eq!(play(&mut game, &[3, 4, 5, 6]), Some(VoteOutcome::Passed));

    let about_to_die = game.current_day().unwrap().about_to_die().copied().unwrap();
    assert_eq!(about_to_die.nominee, id(1));
    assert_eq!(about_to_die.vote, vote);
    assert_eq!(about_to_die.votes, 4);
}

/// A tie clears the block, but a later nomination still has to beat the tied total.
#[test]
fn test_tie_keeps_the_bar() {
    let mut game = scenario();

    nominate(&mut game, 1, 2);
    assert_eq!(play(&mut game, &[2, 3, 4, 5, 7]), Some(VoteOutcome::Passed));

    nominate(&mut game, 3, 4);
    assert_eq!(play(&mut game, &[2, 3, 4, 5, 7]), Some(VoteOutcome::Tied));
    assert!(game.current_day().unwrap().about_to_die().is_none());

    // Four reaches the majority but not the tie.
    nominate(&mut game, 5, 7);
    assert_eq!(play(&mut game, &[2, 3, 4, 7]), Some(VoteOutcome::Failed));
    let day = game.current_day().unwrap();
    assert!(day.about_to_die().is_none());
    assert_eq!(day.votes_to_beat(), Some(5));
    assert_eq!(game.end_day().unwrap(), None);
}

#[test]
fn test_day_end_reports_about_to_die() {
    let mut game = scenario();
    nominate(&mut game, 1, 2);
    play(&mut game, &[3, 4, 5, 6]);

    let about_to_die = game.end_day().unwrap().unwrap();
    assert_eq!(about_to_die.nominee, id(1));
    assert!(!game.is_day());
    assert!(game.player(id(1)).unwrap().is_alive());
}

#[test]
fn test_nominee_and_nominator_used_up() {
    let mut game = scenario();
    nominate(&mut game, 1, 2);
    play(&mut game, &[]);

    assert_eq!(
        game.nominate(Some(id(3)), Some(id(2))),
        Err(ValidationError::CannotNominate(id(2)))
    );
    assert_eq!(
        game.nominate(Some(id(1)), Some(id(3))),
        Err(ValidationError::AlreadyNominated(id(1)))
    );
}

#[test]
fn test_no_second_nomination_while_voting() {
    let mut game = scenario();
    nominate(&mut game, 1, 2);
    assert!(game.nominate(Some(id(3)), Some(id(4))).is_err());
}

#[test]
fn test_virgin_executes_townsfolk_nominator() {
    let mut game = open_day(&[RoleKind::Virgin, RoleKind::Chef, RoleKind::Imp]);
    assert_eq!(
        game.nominate(Some(id(1)), Some(id(2))),
        Ok(NominationOutcome::Blocked)
    );
    assert!(game.player(id(2)).unwrap().is_ghost());
    assert_eq!(game.current_day().unwrap().executed(), Some(id(2)));
}

// =============================================================================
// Protocol properties
// =============================================================================

#[test]
fn test_preset_applies_once() {
    let mut game = open_day(&[RoleKind::Chef; 5]);
    let vote = nominate(&mut game, 1, 2);
    game.preset_vote(id(3), true).unwrap();

    // Seat 2 is asked first; seat 3's preset stays queued.
    assert!(matches!(game.next_step(), NextStep::Prompt { voter, .. } if voter == id(2)));
    assert_eq!(game.current_vote().unwrap().preset_for(id(3)), Some(true));
    game.cast_vote(vote, id(2), false, Operator::Voter).unwrap();

    assert!(matches!(game.next_step(), NextStep::Preset { voter, yes: true, .. } if voter == id(3)));
    game.cast_vote(vote, id(3), true, Operator::Preset).unwrap();

    // The next voter is prompted, not handed the consumed preset.
    assert!(matches!(game.next_step(), NextStep::Prompt { voter, .. } if voter == id(4)));
    assert_eq!(game.current_vote().unwrap().preset_for(id(3)), None);
}

#[test]
fn test_scaled_yes_weight_only_counts_for_target() {
    let mut game = open_day(&[RoleKind::Chef, RoleKind::Bureaucrat, RoleKind::Imp, RoleKind::Monk, RoleKind::Mayor]);
    game.ability_state_mut(&AbilityRef::root(id(2))).unwrap().target = Some(id(4));

    nominate(&mut game, 3, 1);
    play(&mut game, &[4]);
    let day = game.current_day().unwrap();
    let vote = day.votes().last().unwrap();
    assert_eq!(vote.votes(), 3);
    assert!(vote.history().iter().all(|b| b.voter == id(4) || b.weight == 0));
}

#[test]
fn test_voudon_majority_is_one() {
    let mut game = open_day(&[RoleKind::Chef, RoleKind::Voudon, RoleKind::Imp, RoleKind::Monk, RoleKind::Mayor]);
    nominate(&mut game, 3, 1);
    assert_eq!(game.current_vote().unwrap().majority(), 1);
    assert_eq!(play(&mut game, &[2]), Some(VoteOutcome::Passed));
}

#[test]
fn test_storytellers_vote() {
    let mut game = open_day(&[RoleKind::Chef; 4]);
    let outcome = game.nominate(None, Some(id(2))).unwrap();
    assert!(matches!(outcome, NominationOutcome::Started(_)));
    assert_eq!(
        game.current_vote().unwrap().order(),
        &[id(1), id(2), id(3), id(4)]
    );

    assert_eq!(play(&mut game, &[1, 2]), Some(VoteOutcome::Passed));
    assert!(game.current_day().unwrap().about_to_die().is_none());
}

#[test]
fn test_exile_counts_everyone() {
    let mut game = open_day(&[RoleKind::Chef, RoleKind::Chef, RoleKind::Chef, RoleKind::Chef, RoleKind::Gunslinger]);
    game.kill(id(1), false, false).unwrap();
    game.kill(id(2), false, false).unwrap();

    nominate(&mut game, 5, 3);
    let vote = game.current_vote().unwrap();
    assert_eq!(vote.majority(), 3);
    assert_eq!(vote.order().first(), Some(&id(4)));

    // The dead vote freely on an exile.
    assert_eq!(play(&mut game, &[1, 2, 4]), Some(VoteOutcome::Passed));
    assert_eq!(game.player(id(1)).unwrap().dead_votes(), 1);
}

// =============================================================================
// Seating
// =============================================================================

#[test]
fn test_reseat_unchanged_order() {
    let mut game = seated(&[RoleKind::Chef, RoleKind::Empath, RoleKind::Imp, RoleKind::Monk]);
    game.kill(id(3), false, false).unwrap();
    let before: Vec<_> = game.players().iter().map(|p| (p.id(), p.position(), p.is_alive())).collect();

    game.reseat(&game.seating()).unwrap();

    let after: Vec<_> = game.players().iter().map(|p| (p.id(), p.position(), p.is_alive())).collect();
    assert_eq!(before, after);
}

#[test]
fn test_reseat_rejects_partial_order() {
    let mut game = seated(&[RoleKind::Chef; 3]);
    assert_eq!(game.reseat(&[id(1), id(2)]), Err(ValidationError::InvalidSeating));
    assert_eq!(game.reseat(&[id(1), id(2), id(2)]), Err(ValidationError::InvalidSeating));
}

proptest! {
    #[test]
    fn prop_majority_is_half_rounded_up(alive in 1usize..40) {
        let majority = majority_for(alive) as usize;
        prop_assert!(majority * 2 >= alive);
        prop_assert!((majority - 1) * 2 < alive);
    }

    #[test]
    fn prop_vote_majority_tracks_living(players in 3u64..14, dead in 0u64..3) {
        let mut builder = Game::builder();
        for n in 1..=players {
            builder = builder.player(id(n), RoleKind::Chef);
        }
        let mut game = builder.build().unwrap();
        game.start_day(&[]).unwrap();
        game.open_noms().unwrap();
        for n in 1..=dead {
            game.kill(id(n), false, false).unwrap();
        }

        nominate(&mut game, players, players - 1);
        let alive = (players - dead) as usize;
        prop_assert_eq!(game.current_vote().unwrap().majority(), majority_for(alive));
    }

    #[test]
    fn prop_reseat_indexes_positions(seed in any::<u64>(), players in 2u64..12) {
        let mut builder = Game::builder();
        for n in 1..=players {
            builder = builder.player(id(n), RoleKind::Chef);
        }
        let mut game = builder.build().unwrap();
        game.randomize_seating(&mut townsquare::SeatRng::new(seed));

        for (seat, player) in game.players().iter().enumerate() {
            prop_assert_eq!(player.position(), seat);
        }
        let mut ids: Vec<_> = game.seating();
        ids.sort();
        prop_assert_eq!(ids, (1..=players).map(id).collect::<Vec<_>>());
    }
}
