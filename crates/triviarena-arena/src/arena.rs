//! The coordinator: stage buckets, battles, disconnects and scores.

use serde::Serialize;
use tracing::{debug, info, trace, warn};
use triviarena_battle::{Battle, BattleConfig, Combatant, Outcome};
use triviarena_protocol::{Scores, ServerMessage, UserId};
use triviarena_session::{
    Fighting, Guts, Outbound, Reaction, Registered, Stage, StageKind, Unconnected, Unregistered,
};

use crate::itertools::VecExt;
use crate::{ArenaError, Bucket, Leaderboard};

/// Point-in-time view of the arena, for observability and tests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArenaSnapshot {
    pub unconnected: Vec<UserId>,
    pub unregistered: Vec<UserId>,
    pub registered: Vec<UserId>,
    pub fighting: Vec<UserId>,
    /// Seat pairs of the active battles, oldest first.
    pub battles: Vec<[UserId; 2]>,
    pub pending_disconnects: Vec<UserId>,
    pub leaderboard: Scores,
}

/// Owns every connected user and every running battle.
///
/// Socket events mutate a single user. Everything that involves more than
/// one user (battles, matchmaking, disconnect clean-up, broadcasts)
/// happens in [`step`](Self::step), once per tick.
///
/// Not thread-safe on purpose: a single actor task owns it (see
/// [`spawn_arena`](crate::spawn_arena)).
#[derive(Debug)]
pub struct Arena {
    battle_config: BattleConfig,
    last_id: u64,
    unconnected: Bucket<Unconnected>,
    unregistered: Bucket<Unregistered>,
    registered: Bucket<Registered>,
    fighting: Bucket<Fighting>,
    battles: Vec<Battle>,
    disconnects: Vec<UserId>,
    leaderboard: Leaderboard,
}

impl Arena {
    pub fn new(battle_config: BattleConfig) -> Self {
        Self {
            battle_config,
            last_id: 0,
            unconnected: Bucket::new(),
            unregistered: Bucket::new(),
            registered: Bucket::new(),
            fighting: Bucket::new(),
            battles: Vec::new(),
            disconnects: Vec::new(),
            leaderboard: Leaderboard::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Socket events
    // -----------------------------------------------------------------------

    /// A socket was accepted. Returns the user's new id.
    ///
    /// Ids start at 1, only ever grow, and are never handed out twice.
    pub fn socket_created(&mut self, outbound: Outbound) -> UserId {
        self.last_id += 1;
        let id = UserId(self.last_id);
        self.unconnected.push(Unconnected::new(Guts::new(id, outbound)));
        debug!(%id, "socket created");
        id
    }

    /// The websocket handshake completed.
    pub fn user_opened(&mut self, id: UserId) {
        let Some(user) = self.unconnected.remove(id) else {
            warn!(%id, "open event for a user that isn't unconnected");
            return;
        };
        self.unregistered.push(user.open());
        debug!(%id, "user opened");
    }

    /// The user picked a name. Blank names are ignored without a reply.
    pub fn user_registered(&mut self, id: UserId, name: String) {
        let Some(index) = self.unregistered.position(id) else {
            warn!(%id, "register for a user that isn't unregistered");
            return;
        };
        let Some(user) = self.unregistered.remove(id) else {
            return;
        };
        match user.register(name) {
            Ok(user) => self.registered.push(user),
            Err(user) => {
                debug!(%id, "blank name ignored");
                self.unregistered.insert(index, user);
            }
        }
    }

    /// The socket closed. The user stays where they are until the next
    /// tick, which is when battles learn about it.
    pub fn user_disconnected(&mut self, id: UserId) {
        debug!(%id, "disconnect queued");
        self.disconnects.push(id);
    }

    /// Routes a raw inbound payload to whichever stage holds the user.
    pub fn received(&mut self, id: UserId, data: &[u8]) {
        let reaction = if let Some(user) = self.unconnected.get_mut(id) {
            user.handle(data)
        } else if let Some(user) = self.unregistered.get_mut(id) {
            user.handle(data)
        } else if let Some(user) = self.registered.get_mut(id) {
            user.handle(data)
        } else if let Some(user) = self.fighting.get_mut(id) {
            user.handle(data)
        } else {
            debug!(%id, "message for unknown user dropped");
            return;
        };

        match reaction {
            Reaction::None => {}
            Reaction::Register(name) => self.user_registered(id, name),
        }
    }

    // -----------------------------------------------------------------------
    // Tick
    // -----------------------------------------------------------------------

    /// Runs one tick. The phases always run in this order:
    ///
    /// 1. advance every battle and deliver its renders
    /// 2. tell every battle about this tick's disconnects
    /// 3. harvest finished battles: score them, fighters back to registered
    /// 4. purge disconnected users from whatever bucket holds them
    /// 5. pair registered users into new battles, in join order
    /// 6. send the leaderboard to everyone still registered
    ///
    /// An error means an internal invariant broke; the arena must not be
    /// stepped again.
    pub fn step(&mut self) -> Result<(), ArenaError> {
        self.advance_battles()?;
        self.notify_disconnects();
        self.harvest()?;
        self.purge_disconnected();
        self.matchmake();
        self.broadcast_leaderboard();
        trace!(
            registered = self.registered.len(),
            fighting = self.fighting.len(),
            battles = self.battles.len(),
            "tick done"
        );
        Ok(())
    }

    fn advance_battles(&mut self) -> Result<(), ArenaError> {
        for battle in &mut self.battles {
            let [l, r] = battle.fighters();
            let Some((left, right)) = self.fighting.pair_mut(l, r) else {
                let missing = if self.fighting.contains(l) { r } else { l };
                return Err(ArenaError::MissingFighter(missing));
            };
            for (to, view) in battle.step(left, right)? {
                let recipient = if to == l { &*left } else { &*right };
                recipient.send(ServerMessage::Battle { battle: view });
            }
        }
        Ok(())
    }

    fn notify_disconnects(&mut self) {
        for &id in &self.disconnects {
            for battle in &mut self.battles {
                battle.disconnect_happened(id);
            }
        }
    }

    fn harvest(&mut self) -> Result<(), ArenaError> {
        for battle in self.battles.extract(Battle::is_done) {
            let Some(Outcome { winner, loser }) = battle.outcome() else {
                continue;
            };
            let winner = self
                .fighting
                .remove(winner)
                .ok_or(ArenaError::MissingFighter(winner))?
                .leave_battle();
            let loser = self
                .fighting
                .remove(loser)
                .ok_or(ArenaError::MissingFighter(loser))?
                .leave_battle();

            self.leaderboard.record(winner.name(), loser.name());
            info!(
                winner = winner.name(),
                loser = loser.name(),
                "battle harvested"
            );

            // Back into the queue in seat order.
            let (first, second) = if battle.fighters()[0] == winner.id() {
                (winner, loser)
            } else {
                (loser, winner)
            };
            self.registered.push(first);
            self.registered.push(second);
        }
        Ok(())
    }

    fn purge_disconnected(&mut self) {
        for id in std::mem::take(&mut self.disconnects) {
            if self.purge(id) {
                info!(%id, "user disconnected");
            }
        }
    }

    /// Drops the user from whichever bucket holds them. Absent ids are a
    /// no-op. Returns whether anything was removed.
    fn purge(&mut self, id: UserId) -> bool {
        let found = self.unconnected.remove(id).map(Stage::dispose).is_some()
            || self.unregistered.remove(id).map(Stage::dispose).is_some()
            || self.registered.remove(id).map(Stage::dispose).is_some()
            || self.fighting.remove(id).map(Stage::dispose).is_some();
        if !found {
            debug!(%id, "purge of absent user ignored");
        }
        found
    }

    fn matchmake(&mut self) {
        for (left, right) in self.registered.drain_pairs() {
            let ids = [left.id(), right.id()];
            self.fighting.push(left.enter_battle(self.battle_config.base_health));
            self.fighting.push(right.enter_battle(self.battle_config.base_health));
            self.battles
                .push(Battle::new(ids[0], ids[1], self.battle_config.clone()));
        }
    }

    fn broadcast_leaderboard(&self) {
        if self.registered.is_empty() {
            return;
        }
        let users: Vec<String> = self
            .registered
            .iter()
            .map(|u| format!("{} (waiting)", u.name()))
            .chain(
                self.fighting
                    .iter()
                    .map(|u| format!("{} (fighting)", u.name())),
            )
            .collect();

        for user in self.registered.iter() {
            user.send(ServerMessage::Leaderboard {
                leaderboard: self.leaderboard.scores().clone(),
                you: user.name().to_string(),
                users: users.clone(),
            });
        }
    }

    // -----------------------------------------------------------------------
    // Shutdown and inspection
    // -----------------------------------------------------------------------

    /// Drops every user and battle. Every connection's outbound queue
    /// closes, which closes the sockets.
    pub fn dispose(&mut self) {
        let users = self.unconnected.drain().len()
            + self.unregistered.drain().len()
            + self.registered.drain().len()
            + self.fighting.drain().len();
        self.battles.clear();
        self.disconnects.clear();
        info!(users, "arena disposed");
    }

    /// Which stage currently holds `id`, if any.
    pub fn stage_of(&self, id: UserId) -> Option<StageKind> {
        if self.unconnected.contains(id) {
            Some(StageKind::Unconnected)
        } else if self.unregistered.contains(id) {
            Some(StageKind::Unregistered)
        } else if self.registered.contains(id) {
            Some(StageKind::Registered)
        } else if self.fighting.contains(id) {
            Some(StageKind::Fighting)
        } else {
            None
        }
    }

    pub fn leaderboard(&self) -> &Leaderboard {
        &self.leaderboard
    }

    pub fn battles(&self) -> &[Battle] {
        &self.battles
    }

    pub fn snapshot(&self) -> ArenaSnapshot {
        ArenaSnapshot {
            unconnected: self.unconnected.ids(),
            unregistered: self.unregistered.ids(),
            registered: self.registered.ids(),
            fighting: self.fighting.ids(),
            battles: self.battles.iter().map(Battle::fighters).collect(),
            pending_disconnects: self.disconnects.clone(),
            leaderboard: self.leaderboard.scores().clone(),
        }
    }
}

impl Default for Arena {
    fn default() -> Self {
        Self::new(BattleConfig::default())
    }
}
