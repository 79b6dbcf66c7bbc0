//! Staubsauger-Welt mit drei Räumen und einem einfachen Reflex-Agenten.
//!
//! Die Regeln hängen nur vom aktuellen Percept `(Raum, Zustand)` ab und
//! laufen über dieselbe [`RuleTable`] wie die übrigen Agenten.

use reflexa_core::{Decision, Fallback, Rule, RuleTable};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Room {
    A,
    B,
    C,
}

impl fmt::Display for Room {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoomStatus {
    Dirty,
    Clean,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VacuumAction {
    Vacuum,
    Left,
    Right,
    NoOp,
}

impl fmt::Display for VacuumAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VacuumPercept {
    pub location: Room,
    pub status: RoomStatus,
}

fn reflex_rules() -> RuleTable<VacuumPercept, VacuumAction> {
    RuleTable::new(
        vec![
            Rule {
                name: "Dirty",
                when: |p: &VacuumPercept| p.status == RoomStatus::Dirty,
                action: VacuumAction::Vacuum,
                explain: |p: &VacuumPercept| format!("Room {} is dirty", p.location),
            },
            Rule {
                name: "CleanAtA",
                when: |p: &VacuumPercept| p.location == Room::A,
                action: VacuumAction::Right,
                explain: |_: &VacuumPercept| "A is clean, move right".into(),
            },
            Rule {
                name: "CleanAtB",
                when: |p: &VacuumPercept| p.location == Room::B,
                action: VacuumAction::Left,
                explain: |_: &VacuumPercept| "B is clean, move left".into(),
            },
            Rule {
                name: "CleanAtC",
                when: |p: &VacuumPercept| p.location == Room::C,
                action: VacuumAction::Left,
                explain: |_: &VacuumPercept| "C is clean, move left".into(),
            },
        ],
        Fallback {
            name: "NoOp",
            action: VacuumAction::NoOp,
            explain: |_: &VacuumPercept| "No rule for this percept".into(),
        },
    )
}

/// Reflex-Agent ohne Gedächtnis.
#[derive(Debug)]
pub struct ReflexVacuum {
    rules: RuleTable<VacuumPercept, VacuumAction>,
}

impl Default for ReflexVacuum {
    fn default() -> Self {
        Self {
            rules: reflex_rules(),
        }
    }
}

impl ReflexVacuum {
    #[must_use]
    pub fn select_action(&self, percept: &VacuumPercept) -> Decision<VacuumAction> {
        self.rules.evaluate(percept, None)
    }

    #[must_use]
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.names()
    }
}

/// Ein Eintrag im Simulationsprotokoll.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VacuumStep {
    pub step: usize,
    pub percept: VacuumPercept,
    pub action: VacuumAction,
    pub rule: String,
    pub location_after: Room,
    pub cleaned: usize,
}

/// Drei Räume, anfangs alle schmutzig, Agent startet in A.
#[derive(Debug, Clone, PartialEq)]
pub struct VacuumWorld {
    rooms: BTreeMap<Room, RoomStatus>,
    location: Room,
    cleaned: usize,
}

impl Default for VacuumWorld {
    fn default() -> Self {
        Self {
            rooms: [Room::A, Room::B, Room::C]
                .into_iter()
                .map(|r| (r, RoomStatus::Dirty))
                .collect(),
            location: Room::A,
            cleaned: 0,
        }
    }
}

impl VacuumWorld {
    #[must_use]
    pub fn percept(&self) -> VacuumPercept {
        VacuumPercept {
            location: self.location,
            status: self.status(self.location),
        }
    }

    #[must_use]
    pub fn status(&self, room: Room) -> RoomStatus {
        self.rooms.get(&room).copied().unwrap_or(RoomStatus::Clean)
    }

    #[must_use]
    pub fn location(&self) -> Room {
        self.location
    }

    #[must_use]
    pub fn cleaned(&self) -> usize {
        self.cleaned
    }

    #[must_use]
    pub fn all_clean(&self) -> bool {
        self.rooms.values().all(|s| *s == RoomStatus::Clean)
    }

    pub fn execute(&mut self, action: VacuumAction) {
        match action {
            VacuumAction::Vacuum => {
                if self.status(self.location) == RoomStatus::Dirty {
                    self.rooms.insert(self.location, RoomStatus::Clean);
                    self.cleaned += 1;
                }
            }
            VacuumAction::Right => {
                self.location = match self.location {
                    Room::A => Room::B,
                    Room::B | Room::C => Room::C,
                };
            }
            VacuumAction::Left => {
                self.location = match self.location {
                    Room::C => Room::B,
                    Room::B | Room::A => Room::A,
                };
            }
            VacuumAction::NoOp => {}
        }
    }

    /// Lässt `agent` höchstens `steps` Schritte laufen; bricht ab, sobald alles sauber ist.
    pub fn run(&mut self, agent: &ReflexVacuum, steps: usize) -> Vec<VacuumStep> {
        let mut log = Vec::with_capacity(steps);
        for step in 1..=steps {
            if self.all_clean() {
                break;
            }
            let percept = self.percept();
            let decision = agent.select_action(&percept);
            self.execute(decision.action);
            log.push(VacuumStep {
                step,
                percept,
                action: decision.action,
                rule: decision.rule,
                location_after: self.location,
                cleaned: self.cleaned,
            });
        }
        log
    }
}
