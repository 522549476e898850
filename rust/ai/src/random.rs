//! Uniformly random legal-move bot.

use std::sync::Mutex;

use deckflow_engine::game::PlayerPerspective;
use deckflow_engine::player::PlayerAction;
use rand::SeedableRng;
use rand::seq::IndexedRandom;
use rand_chacha::ChaCha20Rng;

use crate::{AiError, BotPlayer};

/// Picks uniformly among the legal actions it is shown. Never forfeits.
#[derive(Debug)]
pub struct RandomBot {
    rng: Mutex<ChaCha20Rng>,
}

impl RandomBot {
    pub fn new(seed: Option<u64>) -> Self {
        let seed = seed.unwrap_or_else(rand::random);
        Self {
            rng: Mutex::new(ChaCha20Rng::seed_from_u64(seed)),
        }
    }
}

impl Default for RandomBot {
    fn default() -> Self {
        Self::new(None)
    }
}

impl BotPlayer for RandomBot {
    fn choose_action(&self, view: &PlayerPerspective) -> Result<PlayerAction, AiError> {
        let mut rng = self
            .rng
            .lock()
            .map_err(|_| AiError::Internal("rng lock poisoned".into()))?;
        view.legal_actions
            .choose(&mut *rng)
            .cloned()
            .ok_or_else(|| AiError::NoLegalMoves(view.player_id.clone()))
    }

    fn name(&self) -> &str {
        "RandomBot"
    }
}
