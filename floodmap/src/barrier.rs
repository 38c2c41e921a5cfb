//! Barrière de jointure sur N sources nommées
//!
//! Les filtres liés ne peuvent être construits qu'une fois toutes leurs
//! sources chargées: les options viennent des valeurs réellement présentes.

use std::collections::BTreeSet;

use crate::FloodError;

/// État d'une barrière après un signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarrierState {
    /// Il manque encore au moins une source
    Pending { remaining: usize },
    /// Toutes les sources attendues ont signalé
    Ready,
}

/// Attend un ensemble fixe de sources nommées
#[derive(Debug, Clone)]
pub struct LoadBarrier {
    expected: BTreeSet<String>,
    arrived: BTreeSet<String>,
}

impl LoadBarrier {
    pub fn new<I, S>(sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            expected: sources.into_iter().map(Into::into).collect(),
            arrived: BTreeSet::new(),
        }
    }

    /// Signale qu'une source est chargée.
    ///
    /// Les sources inconnues et les signaux répétés sont ignorés.
    pub fn arrive(&mut self, source: &str) -> BarrierState {
        if self.expected.contains(source) {
            self.arrived.insert(source.to_string());
        }
        self.state()
    }

    pub fn state(&self) -> BarrierState {
        let remaining = self.expected.len() - self.arrived.len();
        if remaining == 0 {
            BarrierState::Ready
        } else {
            BarrierState::Pending { remaining }
        }
    }

    pub fn is_ready(&self) -> bool {
        self.state() == BarrierState::Ready
    }

    /// Sources encore attendues, par ordre alphabétique
    pub fn missing(&self) -> Vec<String> {
        self.expected.difference(&self.arrived).cloned().collect()
    }

    /// Erreur si la barrière n'est pas franchie
    pub fn ensure_ready(&self) -> Result<(), FloodError> {
        if self.is_ready() {
            Ok(())
        } else {
            Err(FloodError::NotReady {
                missing: self.missing(),
            })
        }
    }
}
