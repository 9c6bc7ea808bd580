//! The four stages and the transitions between them.

use triviarena_battle::{AnswerState, Base, Combatant};
use triviarena_protocol::{ClientMessage, Rejection, ServerMessage, UserId};

use crate::{Guts, Reaction, Stage, StageKind};

/// Whether `name` can be registered: anything but empty or whitespace.
pub fn is_valid_name(name: &str) -> bool {
    !name.trim().is_empty()
}

// ---------------------------------------------------------------------------
// Unconnected
// ---------------------------------------------------------------------------

/// Socket accepted, websocket handshake still in flight.
#[derive(Debug)]
pub struct Unconnected {
    guts: Guts,
}

impl Unconnected {
    pub fn new(guts: Guts) -> Self {
        Self { guts }
    }

    /// The handshake completed. Asks the client for a name.
    pub fn open(self) -> Unregistered {
        let next = Unregistered { guts: self.dispose() };
        next.send(ServerMessage::RegisterName);
        next
    }
}

impl Stage for Unconnected {
    const KIND: StageKind = StageKind::Unconnected;

    fn guts(&self) -> &Guts {
        &self.guts
    }

    fn dispose(self) -> Guts {
        self.guts
    }
}

// ---------------------------------------------------------------------------
// Unregistered
// ---------------------------------------------------------------------------

/// Open socket, waiting for a display name.
#[derive(Debug)]
pub struct Unregistered {
    guts: Guts,
}

impl Unregistered {
    /// Takes on a display name.
    ///
    /// An empty or blank name hands the stage back unchanged.
    pub fn register(self, name: String) -> Result<Registered, Self> {
        if !is_valid_name(&name) {
            return Err(self);
        }
        tracing::info!(id = %self.id(), name = %name, "user registered");
        Ok(Registered {
            guts: self.dispose(),
            name,
        })
    }
}

impl Stage for Unregistered {
    const KIND: StageKind = StageKind::Unregistered;

    fn guts(&self) -> &Guts {
        &self.guts
    }

    fn dispose(self) -> Guts {
        self.guts
    }

    fn received(&mut self, msg: ClientMessage) -> Reaction {
        match msg {
            ClientMessage::Register { name } => Reaction::Register(name),
            ClientMessage::Answer { .. } => {
                self.reject(Rejection::UnexpectedMessage);
                Reaction::None
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Registered
// ---------------------------------------------------------------------------

/// Named and idle. Waiting in the matchmaking queue.
#[derive(Debug)]
pub struct Registered {
    guts: Guts,
    name: String,
}

impl Registered {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Paired up. Starts fighting behind a fresh base.
    pub fn enter_battle(self, base_health: i32) -> Fighting {
        Fighting {
            guts: self.guts,
            name: self.name,
            base: Base::new(base_health),
            answer: AnswerState::default(),
        }
    }
}

impl Stage for Registered {
    const KIND: StageKind = StageKind::Registered;

    fn guts(&self) -> &Guts {
        &self.guts
    }

    fn dispose(self) -> Guts {
        self.guts
    }

    fn received(&mut self, _msg: ClientMessage) -> Reaction {
        self.reject(Rejection::UnexpectedMessage);
        Reaction::None
    }
}

// ---------------------------------------------------------------------------
// Fighting
// ---------------------------------------------------------------------------

/// In a battle. Owns the base and the answer slot the battle drives.
#[derive(Debug)]
pub struct Fighting {
    guts: Guts,
    name: String,
    base: Base,
    answer: AnswerState,
}

impl Fighting {
    /// The battle is over. Base and answer slot are discarded.
    pub fn leave_battle(self) -> Registered {
        Registered {
            guts: self.guts,
            name: self.name,
        }
    }
}

impl Stage for Fighting {
    const KIND: StageKind = StageKind::Fighting;

    fn guts(&self) -> &Guts {
        &self.guts
    }

    fn dispose(self) -> Guts {
        self.guts
    }

    fn received(&mut self, msg: ClientMessage) -> Reaction {
        match msg {
            ClientMessage::Answer { answer } => {
                if let Err(rejection) = self.answer.submit(answer) {
                    self.reject(rejection);
                }
            }
            ClientMessage::Register { .. } => self.reject(Rejection::UnexpectedMessage),
        }
        Reaction::None
    }
}

impl Combatant for Fighting {
    fn id(&self) -> UserId {
        self.guts.id()
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn base(&self) -> &Base {
        &self.base
    }

    fn base_mut(&mut self) -> &mut Base {
        &mut self.base
    }

    fn answer(&self) -> &AnswerState {
        &self.answer
    }

    fn answer_mut(&mut self) -> &mut AnswerState {
        &mut self.answer
    }
}

// =========================================================================
// Tests
// =========================================================================
