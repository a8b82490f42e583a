//! Rules of the adjudicated roles.
//!
//! Each function fills one hook slot of one role (see `RoleKind::hooks`).
//! `me` names the ability being asked; `me.owner` is the player holding it.

use super::{Alignment, Team};
use crate::core::UserId;
use crate::day::Nomination;
use crate::error::ValidationError;
use crate::game::{AbilityRef, Game};
use crate::vote::{Vote, VoteSetup};

fn is_alive(game: &Game, user: UserId) -> bool {
    game.player(user).map(|p| p.is_alive()).unwrap_or(false)
}

fn target_of(game: &Game, me: &AbilityRef) -> Option<UserId> {
    game.ability_state(me).and_then(|s| s.target)
}

// ============================================================================
// Nomination
// ============================================================================

/// The first nomination of the Virgin spends her ability, poisoned or not. A
/// sober Virgin nominated by a Townsfolk executes the nominator instead.
pub fn virgin_nomination(game: &mut Game, me: &AbilityRef, nomination: &Nomination, proceed: bool) -> bool {
    if nomination.nominee() != Some(me.owner) {
        return proceed;
    }
    let sober = game.sober(me);
    let Some(state) = game.ability_state_mut(me) else {
        return proceed;
    };
    if state.used {
        return proceed;
    }
    state.used = true;

    if !sober {
        return proceed;
    }
    let Some(nominator) = nomination.nominator else {
        return proceed;
    };
    let townsfolk = game
        .player(nominator)
        .map(|p| p.character.role().team() == Team::Townsfolk)
        .unwrap_or(false);
    if !townsfolk {
        return proceed;
    }

    tracing::info!(virgin = %me.owner, %nominator, "virgin executes nominator");
    let _ = game.execute(nominator, true);
    false
}

/// Losing the ability is permanent once three or fewer players are alive.
pub fn witch_day_start(game: &mut Game, me: &AbilityRef) {
    if !game.sober(me) || game.alive_count() > 3 {
        return;
    }
    if let Some(state) = game.ability_state_mut(me) {
        state.used = true;
    }
}

/// A cursed player who nominates dies. The nomination itself goes ahead.
pub fn witch_nomination(game: &mut Game, me: &AbilityRef, nomination: &Nomination, proceed: bool) -> bool {
    if !game.sober(me) {
        return proceed;
    }
    let Some(state) = game.ability_state(me) else {
        return proceed;
    };
    if state.used || state.target.is_none() || state.target != nomination.nominator {
        return proceed;
    }
    if let Some(cursed) = nomination.nominator {
        tracing::info!(witch = %me.owner, %cursed, "cursed player nominated");
        let _ = game.kill(cursed, false, false);
    }
    proceed
}

pub fn witch_day_end(game: &mut Game, me: &AbilityRef) {
    if let Some(state) = game.ability_state_mut(me) {
        state.target = None;
    }
}

/// The Golem's first nomination is spent either way. A sober Golem kills a
/// nominee who is not the Demon, and there is no vote.
pub fn golem_nomination(game: &mut Game, me: &AbilityRef, nomination: &Nomination, proceed: bool) -> bool {
    if nomination.nominator != Some(me.owner) {
        return proceed;
    }
    let sober = game.sober(me);
    let Some(state) = game.ability_state_mut(me) else {
        return proceed;
    };
    if state.used {
        return proceed;
    }
    state.used = true;

    let Some(nominee) = nomination.nominee() else {
        return proceed;
    };
    if !sober {
        return proceed;
    }
    let demon = game
        .player(nominee)
        .map(|p| p.character.role().team() == Team::Demon)
        .unwrap_or(true);
    if demon {
        return proceed;
    }

    tracing::info!(golem = %me.owner, %nominee, "golem kills nominee");
    let _ = game.kill(nominee, false, false);
    false
}

/// A screaming Banshee may nominate even as a ghost.
pub fn banshee_noms_called(game: &mut Game, me: &AbilityRef) {
    if !game.sober(me) {
        return;
    }
    let Some(state) = game.ability_state(me) else {
        return;
    };
    if state.active && state.count < 2 {
        if let Ok(player) = game.player_mut(me.owner) {
            player.can_nominate = true;
        }
    }
}

/// A screaming Banshee gets a second nomination each day.
pub fn banshee_nomination(game: &mut Game, me: &AbilityRef, nomination: &Nomination, proceed: bool) -> bool {
    if nomination.nominator != Some(me.owner) || !game.sober(me) {
        return proceed;
    }
    let Some(state) = game.ability_state_mut(me) else {
        return proceed;
    };
    if !state.active {
        return proceed;
    }
    state.count = state.count.saturating_add(1);
    let again = state.count < 2;
    if again {
        if let Ok(player) = game.player_mut(me.owner) {
            player.can_nominate = true;
        }
    }
    proceed
}

pub fn banshee_day_end(game: &mut Game, me: &AbilityRef) {
    if let Some(state) = game.ability_state_mut(me) {
        state.count = 0;
    }
}

pub fn banshee_double_vote(game: &Game, me: &AbilityRef) -> bool {
    game.sober(me) && game.ability_state(me).is_some_and(|s| s.active)
}

// ============================================================================
// Death
// ============================================================================

/// While the Tea Lady lives, neither of her living neighbours can die if both
/// are good.
pub fn tea_lady_death(game: &mut Game, me: &AbilityRef, target: UserId, dies: bool) -> bool {
    if !game.sober(me) || !is_alive(game, me.owner) {
        return dies;
    }
    let Some((left, right)) = game.living_neighbors(me.owner) else {
        return dies;
    };
    if target != left && target != right {
        return dies;
    }
    let good = |user| {
        game.player(user)
            .map(|p| p.alignment == Alignment::Good)
            .unwrap_or(false)
    };
    if good(left) && good(right) {
        tracing::debug!(tea_lady = %me.owner, %target, "protected by tea lady");
        return false;
    }
    dies
}

pub fn monk_death(game: &mut Game, me: &AbilityRef, target: UserId, dies: bool) -> bool {
    if game.sober(me) && is_alive(game, me.owner) && target_of(game, me) == Some(target) {
        tracing::debug!(monk = %me.owner, %target, "protected by monk");
        return false;
    }
    dies
}

pub fn innkeeper_death(game: &mut Game, me: &AbilityRef, target: UserId, dies: bool) -> bool {
    let protected = game
        .ability_state(me)
        .is_some_and(|s| s.extra_targets.contains(&target));
    if game.sober(me) && protected {
        tracing::debug!(innkeeper = %me.owner, %target, "protected by innkeeper");
        return false;
    }
    dies
}

/// The first time the Fool would die, he doesn't.
pub fn fool_death(game: &mut Game, me: &AbilityRef, target: UserId, dies: bool) -> bool {
    survive_once(game, me, target, dies)
}

pub fn sailor_death(game: &mut Game, me: &AbilityRef, target: UserId, dies: bool) -> bool {
    if target == me.owner && game.sober(me) {
        return false;
    }
    dies
}

/// The Zombuul survives its first death.
pub fn zombuul_death(game: &mut Game, me: &AbilityRef, target: UserId, dies: bool) -> bool {
    survive_once(game, me, target, dies)
}

fn survive_once(game: &mut Game, me: &AbilityRef, target: UserId, dies: bool) -> bool {
    if target != me.owner || !dies || !game.sober(me) {
        return dies;
    }
    match game.ability_state_mut(me) {
        Some(state) if !state.used => {
            state.used = true;
            false
        }
        _ => dies,
    }
}

/// The Grandmother follows her grandchild. The chained death only happens if
/// the grandchild actually dies.
pub fn grandmother_death(game: &mut Game, me: &AbilityRef, target: UserId, dies: bool) -> bool {
    if game.sober(me) && is_alive(game, me.owner) && target_of(game, me) == Some(target) {
        game.queue_death(me.owner);
    }
    dies
}

/// The Lleech dies with its host.
pub fn lleech_death(game: &mut Game, me: &AbilityRef, target: UserId, dies: bool) -> bool {
    if game.sober(me) && is_alive(game, me.owner) && target_of(game, me) == Some(target) {
        game.queue_death(me.owner);
    }
    dies
}

/// The Assassin's chosen target dies regardless of protection.
pub fn assassin_death(game: &mut Game, me: &AbilityRef, target: UserId, dies: bool) -> bool {
    if !game.sober(me) {
        return dies;
    }
    match game.ability_state_mut(me) {
        Some(state) if !state.used && state.target == Some(target) => {
            state.used = true;
            tracing::debug!(assassin = %me.owner, %target, "assassination");
            true
        }
        _ => dies,
    }
}

// ============================================================================
// Seating
// ============================================================================

/// Records the Empath's nearest living neighbours.
pub fn empath_seating(game: &mut Game, me: &AbilityRef) {
    let neighbours = game.living_neighbors(me.owner);
    if let Some(state) = game.ability_state_mut(me) {
        state.extra_targets.clear();
        if let Some((left, right)) = neighbours {
            state.extra_targets.push(left);
            if right != left {
                state.extra_targets.push(right);
            }
        }
    }
}

// ============================================================================
// Voting
// ============================================================================

/// The Butler may only raise a hand once their master has voted yes.
pub fn butler_vote(game: &Game, me: &AbilityRef, vote: &Vote, yes: bool) -> Result<(), ValidationError> {
    if !yes || !game.sober(me) {
        return Ok(());
    }
    match target_of(game, me) {
        Some(master) if !vote.voted_yes(master) => Err(ValidationError::VoteForbidden {
            voter: me.owner,
            reason: "the Butler's master has not voted yes",
        }),
        _ => Ok(()),
    }
}

pub fn thief_vote_beginning(game: &Game, me: &AbilityRef, setup: &mut VoteSetup) {
    if let (true, Some(target)) = (game.sober(me), target_of(game, me)) {
        setup.scale_yes(target, -1);
    }
}

pub fn bureaucrat_vote_beginning(game: &Game, me: &AbilityRef, setup: &mut VoteSetup) {
    if let (true, Some(target)) = (game.sober(me), target_of(game, me)) {
        setup.scale_yes(target, 3);
    }
}

/// A Beggar without a vote token has no say.
pub fn beggar_vote_beginning(game: &Game, me: &AbilityRef, setup: &mut VoteSetup) {
    let holds_token = game.ability_state(me).is_some_and(|s| s.active);
    if game.sober(me) && !holds_token {
        setup.zero_yes(me.owner);
    }
}

/// While the Voudon lives only the dead and the Voudon vote, for free, and
/// a single vote is a majority.
pub fn voudon_vote_beginning(game: &Game, me: &AbilityRef, setup: &mut VoteSetup) {
    if !game.sober(me) || !is_alive(game, me.owner) {
        return;
    }
    setup.majority = 1;
    setup.free_dead_votes = true;
    let mut allowed: Vec<UserId> = game
        .players()
        .iter()
        .filter(|p| p.is_ghost())
        .map(|p| p.id())
        .collect();
    allowed.push(me.owner);
    setup.restricted_to = Some(allowed);
}
