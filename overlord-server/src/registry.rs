//! Matchmaking and the per-match session registry
//!
//! One lobby lock guards the waiting queue, participant bindings and the
//! session map, so pairing either binds both participants or changes nothing.
//! Each session has its own lock; intents for one match are serialized while
//! separate matches proceed independently.
//!
//! The `*_with` variants hand deliveries to a callback while the relevant lock
//! is still held, so every participant sees events in the order they happened.

use crate::protocol::{ClientIntent, MatchId, ServerEvent};
use overlord_core::{
    ActionError, ActionResult, ClientView, GameState, RandomSource, RngSource, RulesVariant,
    ScenarioCatalog, Side, DEFAULT_SCENARIO,
};
use rustc_hash::FxHashMap;
use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Connection-scoped identity of a client
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParticipantId(pub u64);

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p-{}", self.0)
    }
}

/// An event addressed to one participant
#[derive(Clone, Debug, PartialEq)]
pub struct Delivery {
    pub to: ParticipantId,
    pub event: ServerEvent,
}

impl Delivery {
    pub fn new(to: ParticipantId, event: ServerEvent) -> Self {
        Self { to, event }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ============================================================================
// SESSION
// ============================================================================

/// One authoritative match
pub struct GameSession {
    pub id: MatchId,
    pub state: GameState,
    /// Indexed by `Side as usize`
    participants: [ParticipantId; 2],
    rng: Box<dyn RandomSource + Send>,
    /// Set when a participant leaves; late intents are refused
    closed: bool,
}

impl GameSession {
    pub fn participant(&self, side: Side) -> ParticipantId {
        self.participants[side as usize]
    }

    /// Fresh snapshot for each participant
    fn snapshots(&self) -> Vec<Delivery> {
        [Side::Allies, Side::Axis]
            .into_iter()
            .map(|side| {
                Delivery::new(
                    self.participant(side),
                    ServerEvent::state(self.state.view_for(side)),
                )
            })
            .collect()
    }

    fn apply(&mut self, side: Side, intent: &ClientIntent) -> ActionResult<()> {
        match *intent {
            ClientIntent::PlayCard { card_index } => self.state.play_card(side, card_index),
            ClientIntent::MoveUnit { from, to } => self.state.move_unit(side, from, to),
            ClientIntent::Attack { from, to } => self
                .state
                .attack(side, from, to, self.rng.as_mut())
                .map(|_| ()),
            ClientIntent::EndTurn => self.state.end_turn(side, self.rng.as_mut()),
            ClientIntent::FindMatch { .. } => Err(ActionError::phase("already in a match")),
        }
    }
}

/// Apply an intent and deliver the outcome before releasing the session lock
fn run_in_session(
    session: &Mutex<GameSession>,
    participant: ParticipantId,
    side: Side,
    intent: &ClientIntent,
    deliver: impl FnOnce(Vec<Delivery>),
) {
    let mut session = lock(session);
    if session.closed {
        let err = ActionError::NoActiveSession;
        return deliver(vec![Delivery::new(participant, ServerEvent::rejected(&err))]);
    }
    let deliveries = match session.apply(side, intent) {
        Ok(()) => session.snapshots(),
        Err(err) => {
            tracing::debug!(
                %participant,
                match_id = %session.id,
                error = %err,
                "intent rejected"
            );
            vec![Delivery::new(participant, ServerEvent::rejected(&err))]
        }
    };
    deliver(deliveries);
}

// ============================================================================
// REGISTRY
// ============================================================================

#[derive(Default)]
struct Lobby {
    queue: VecDeque<ParticipantId>,
    bindings: FxHashMap<ParticipantId, (MatchId, Side)>,
    sessions: FxHashMap<MatchId, Arc<Mutex<GameSession>>>,
    next_match: u64,
}

/// Registry settings
#[derive(Clone, Debug, Default)]
pub struct RegistryConfig {
    pub rules: RulesVariant,
    /// Base seed; each match derives its own stream from it
    pub seed: Option<u64>,
}

/// Matchmaking queue plus every live session
pub struct MatchRegistry {
    lobby: Mutex<Lobby>,
    catalog: ScenarioCatalog,
    config: RegistryConfig,
}

impl MatchRegistry {
    pub fn new(catalog: ScenarioCatalog, config: RegistryConfig) -> Self {
        Self {
            lobby: Mutex::new(Lobby::default()),
            catalog,
            config,
        }
    }

    pub fn scenarios(&self) -> &ScenarioCatalog {
        &self.catalog
    }

    pub fn active_sessions(&self) -> usize {
        lock(&self.lobby).sessions.len()
    }

    pub fn queue_len(&self) -> usize {
        lock(&self.lobby).queue.len()
    }

    /// Current snapshot for a bound participant
    pub fn view_for(&self, participant: ParticipantId) -> Option<ClientView> {
        let (session, side) = self.session_of(participant)?;
        let session = lock(&session);
        Some(session.state.view_for(side))
    }

    fn session_of(&self, participant: ParticipantId) -> Option<(Arc<Mutex<GameSession>>, Side)> {
        let lobby = lock(&self.lobby);
        let (match_id, side) = *lobby.bindings.get(&participant)?;
        let session = lobby.sessions.get(&match_id)?.clone();
        Some((session, side))
    }

    fn source_for(&self, match_id: MatchId) -> Box<dyn RandomSource + Send> {
        match self.config.seed {
            Some(seed) => Box::new(RngSource::seeded(seed.wrapping_add(match_id.0))),
            None => Box::new(RngSource::from_entropy()),
        }
    }

    /// Queue a participant or pair them with the longest-waiting one
    pub fn find_match(
        &self,
        participant: ParticipantId,
        scenario_id: Option<&str>,
    ) -> Vec<Delivery> {
        let mut out = Vec::new();
        self.find_match_with(participant, scenario_id, |deliveries| out = deliveries);
        out
    }

    /// [`find_match`](Self::find_match), delivering under the lobby lock
    pub fn find_match_with(
        &self,
        participant: ParticipantId,
        scenario_id: Option<&str>,
        deliver: impl FnOnce(Vec<Delivery>),
    ) {
        let mut lobby = lock(&self.lobby);
        let deliveries = self.enqueue(&mut lobby, participant, scenario_id);
        deliver(deliveries);
    }

    fn enqueue(
        &self,
        lobby: &mut Lobby,
        participant: ParticipantId,
        scenario_id: Option<&str>,
    ) -> Vec<Delivery> {
        let reject = |err: ActionError| {
            vec![Delivery::new(participant, ServerEvent::rejected(&err))]
        };

        if lobby.bindings.contains_key(&participant) {
            return reject(ActionError::phase("already in a match"));
        }
        if lobby.queue.contains(&participant) {
            return vec![Delivery::new(participant, ServerEvent::WaitingForOpponent)];
        }

        let scenario_id = scenario_id.unwrap_or(DEFAULT_SCENARIO);
        let Some(scenario) = self.catalog.get(scenario_id) else {
            return reject(ActionError::target(format!("unknown scenario: {}", scenario_id)));
        };

        let Some(&opponent) = lobby.queue.front() else {
            lobby.queue.push_back(participant);
            tracing::info!(%participant, "waiting for opponent");
            return vec![Delivery::new(participant, ServerEvent::WaitingForOpponent)];
        };

        let match_id = MatchId(lobby.next_match);
        let mut rng = self.source_for(match_id);
        let state = match GameState::new(scenario, self.config.rules, rng.as_mut()) {
            Ok(state) => state,
            Err(err) => {
                tracing::warn!(scenario = scenario_id, error = %err, "scenario failed to build");
                return reject(err.into());
            }
        };

        let session = GameSession {
            id: match_id,
            state,
            participants: [opponent, participant],
            rng,
            closed: false,
        };
        let mut deliveries = vec![
            Delivery::new(
                opponent,
                ServerEvent::MatchFound {
                    match_id,
                    side: Side::Allies,
                },
            ),
            Delivery::new(
                participant,
                ServerEvent::MatchFound {
                    match_id,
                    side: Side::Axis,
                },
            ),
        ];
        deliveries.extend(session.snapshots());

        lobby.queue.pop_front();
        lobby.next_match += 1;
        lobby.bindings.insert(opponent, (match_id, Side::Allies));
        lobby.bindings.insert(participant, (match_id, Side::Axis));
        lobby.sessions.insert(match_id, Arc::new(Mutex::new(session)));

        tracing::info!(
            %match_id,
            allies = %opponent,
            axis = %participant,
            scenario = scenario_id,
            "match created"
        );
        deliveries
    }

    /// Route an intent to the participant's session
    pub fn handle(&self, participant: ParticipantId, intent: ClientIntent) -> Vec<Delivery> {
        let mut out = Vec::new();
        self.handle_with(participant, intent, |deliveries| out = deliveries);
        out
    }

    /// [`handle`](Self::handle), delivering under the session lock
    pub fn handle_with(
        &self,
        participant: ParticipantId,
        intent: ClientIntent,
        deliver: impl FnOnce(Vec<Delivery>),
    ) {
        if let ClientIntent::FindMatch { scenario_id } = &intent {
            return self.find_match_with(participant, scenario_id.as_deref(), deliver);
        }

        match self.session_of(participant) {
            Some((session, side)) => run_in_session(&session, participant, side, &intent, deliver),
            None => {
                let err = ActionError::NoActiveSession;
                deliver(vec![Delivery::new(participant, ServerEvent::rejected(&err))]);
            }
        }
    }

    /// Drop a participant from the queue or tear down their match
    pub fn disconnect(&self, participant: ParticipantId) -> Vec<Delivery> {
        let mut out = Vec::new();
        self.disconnect_with(participant, |deliveries| out = deliveries);
        out
    }

    /// [`disconnect`](Self::disconnect); the survivor's notice goes out under
    /// the session lock, after which the session refuses further intents
    pub fn disconnect_with(&self, participant: ParticipantId, deliver: impl FnOnce(Vec<Delivery>)) {
        let mut lobby = lock(&self.lobby);

        if let Some(pos) = lobby.queue.iter().position(|&p| p == participant) {
            lobby.queue.remove(pos);
            tracing::info!(%participant, "left matchmaking queue");
            return;
        }

        let Some((match_id, side)) = lobby.bindings.remove(&participant) else {
            return;
        };
        let Some(session) = lobby.sessions.remove(&match_id) else {
            return;
        };
        let mut session = lock(&session);
        session.closed = true;
        let survivor = session.participant(side.opponent());
        lobby.bindings.remove(&survivor);
        drop(lobby);

        tracing::info!(%match_id, %participant, "match closed after disconnect");
        deliver(vec![Delivery::new(survivor, ServerEvent::OpponentDisconnected)]);
    }
}

impl Default for MatchRegistry {
    fn default() -> Self {
        Self::new(ScenarioCatalog::default(), RegistryConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use overlord_core::{Hex, Phase};
    use std::thread;

    const ALICE: ParticipantId = ParticipantId(1);
    const BOB: ParticipantId = ParticipantId(2);
    const CAROL: ParticipantId = ParticipantId(3);

    fn registry() -> MatchRegistry {
        MatchRegistry::new(
            ScenarioCatalog::default(),
            RegistryConfig {
                rules: RulesVariant::Standard,
                seed: Some(9),
            },
        )
    }

    fn paired() -> MatchRegistry {
        let registry = registry();
        registry.find_match(ALICE, None);
        registry.find_match(BOB, None);
        registry
    }

    fn events_for(deliveries: &[Delivery], to: ParticipantId) -> Vec<&ServerEvent> {
        deliveries
            .iter()
            .filter(|d| d.to == to)
            .map(|d| &d.event)
            .collect()
    }

    fn rejection_code(deliveries: &[Delivery]) -> Option<&str> {
        match deliveries {
            [Delivery {
                event: ServerEvent::ActionRejected { code, .. },
                ..
            }] => Some(code.as_str()),
            _ => None,
        }
    }

    #[test]
    fn test_first_participant_waits() {
        let registry = registry();
        let out = registry.find_match(ALICE, None);
        assert_eq!(out, vec![Delivery::new(ALICE, ServerEvent::WaitingForOpponent)]);
        assert_eq!(registry.queue_len(), 1);
        assert_eq!(registry.active_sessions(), 0);

        // Asking again keeps a single queue entry
        let again = registry.find_match(ALICE, None);
        assert_eq!(again, vec![Delivery::new(ALICE, ServerEvent::WaitingForOpponent)]);
        assert_eq!(registry.queue_len(), 1);
    }

    #[test]
    fn test_pairing_assigns_sides() {
        let registry = registry();
        registry.find_match(ALICE, None);
        let out = registry.find_match(BOB, Some("omaha-beach"));

        assert_eq!(registry.queue_len(), 0);
        assert_eq!(registry.active_sessions(), 1);

        let alice = events_for(&out, ALICE);
        let bob = events_for(&out, BOB);
        assert!(matches!(alice[0], ServerEvent::MatchFound { side: Side::Allies, .. }));
        assert!(matches!(bob[0], ServerEvent::MatchFound { side: Side::Axis, .. }));
        assert!(matches!(alice[1], ServerEvent::GameState { .. }));
        assert!(matches!(bob[1], ServerEvent::GameState { .. }));

        let view = registry.view_for(BOB).unwrap();
        assert_eq!(view.scenario_name, "Omaha Beach");
        assert_eq!(view.player_side, Side::Axis);
        assert_eq!(view.current_player, Side::Allies);
    }

    #[test]
    fn test_unknown_scenario_rejected() {
        let registry = registry();
        registry.find_match(ALICE, None);
        let out = registry.find_match(BOB, Some("stalingrad"));
        assert_eq!(rejection_code(&out), Some("illegal_target"));
        assert_eq!(registry.queue_len(), 1);
        assert_eq!(registry.active_sessions(), 0);
    }

    #[test]
    fn test_third_participant_waits_after_pairing() {
        let registry = registry();
        registry.find_match(ALICE, None);
        let out = registry.find_match(BOB, None);
        assert!(matches!(events_for(&out, ALICE)[0], ServerEvent::MatchFound { .. }));
        assert!(matches!(events_for(&out, BOB)[0], ServerEvent::MatchFound { .. }));
        assert_eq!(registry.queue_len(), 0);

        let out = registry.find_match(CAROL, None);
        assert_eq!(out, vec![Delivery::new(CAROL, ServerEvent::WaitingForOpponent)]);
        assert_eq!(registry.queue_len(), 1);
        assert_eq!(registry.active_sessions(), 1);
    }

    #[test]
    fn test_find_match_while_playing() {
        let registry = paired();
        let out = registry.find_match(ALICE, None);
        assert_eq!(rejection_code(&out), Some("illegal_phase"));
        assert_eq!(registry.queue_len(), 0);
    }

    #[test]
    fn test_intent_without_session() {
        let registry = registry();
        let out = registry.handle(CAROL, ClientIntent::EndTurn);
        assert_eq!(rejection_code(&out), Some("no_active_session"));
    }

    #[test]
    fn test_out_of_turn_goes_to_actor_only() {
        let registry = paired();
        let before = registry.view_for(ALICE).unwrap();
        let out = registry.handle(BOB, ClientIntent::PlayCard { card_index: 0 });
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].to, BOB);
        assert_eq!(rejection_code(&out), Some("out_of_turn"));
        assert_eq!(registry.view_for(ALICE).unwrap(), before);
    }

    #[test]
    fn test_accepted_intent_broadcasts() {
        let registry = paired();
        let out = registry.handle(ALICE, ClientIntent::PlayCard { card_index: 0 });
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|d| matches!(d.event, ServerEvent::GameState { .. })));

        let view = registry.view_for(BOB).unwrap();
        assert_eq!(view.phase, Phase::PlayUnits);
        assert!(view.selected_card.is_some());
        assert_eq!(view.opponent_card_count, 5);

        let out = registry.handle(ALICE, ClientIntent::EndTurn);
        assert_eq!(out.len(), 2);
        assert_eq!(registry.view_for(ALICE).unwrap().current_player, Side::Axis);
    }

    #[test]
    fn test_illegal_move_rejected() {
        let registry = paired();
        registry.handle(ALICE, ClientIntent::PlayCard { card_index: 0 });
        // Axis infantry at 10,6 does not belong to allies
        let out = registry.handle(
            ALICE,
            ClientIntent::MoveUnit {
                from: Hex::new(10, 6),
                to: Hex::new(10, 5),
            },
        );
        assert_eq!(rejection_code(&out), Some("illegal_target"));
    }

    #[test]
    fn test_disconnect_while_waiting() {
        let registry = registry();
        registry.find_match(ALICE, None);
        assert!(registry.disconnect(ALICE).is_empty());
        assert_eq!(registry.queue_len(), 0);

        // Next arrival waits instead of pairing with a ghost
        let out = registry.find_match(BOB, None);
        assert_eq!(out, vec![Delivery::new(BOB, ServerEvent::WaitingForOpponent)]);
    }

    #[test]
    fn test_disconnect_ends_match() {
        let registry = paired();
        let out = registry.disconnect(BOB);
        assert_eq!(out, vec![Delivery::new(ALICE, ServerEvent::OpponentDisconnected)]);
        assert_eq!(registry.active_sessions(), 0);

        let after = registry.handle(ALICE, ClientIntent::EndTurn);
        assert_eq!(rejection_code(&after), Some("no_active_session"));

        // Survivor may queue again
        let again = registry.find_match(ALICE, None);
        assert_eq!(again, vec![Delivery::new(ALICE, ServerEvent::WaitingForOpponent)]);
        assert!(registry.disconnect(CAROL).is_empty());
    }

    #[test]
    fn test_pairing_delivered_under_lobby_lock() {
        let registry = registry();
        registry.find_match(ALICE, None);
        let mut delivered = 0;
        registry.find_match_with(BOB, None, |deliveries| {
            assert!(registry.lobby.try_lock().is_err());
            delivered = deliveries.len();
        });
        assert_eq!(delivered, 4);
    }

    #[test]
    fn test_updates_delivered_under_session_lock() {
        let registry = paired();
        let (session, _) = registry.session_of(ALICE).unwrap();
        let mut delivered = 0;
        registry.handle_with(ALICE, ClientIntent::PlayCard { card_index: 0 }, |deliveries| {
            assert!(session.try_lock().is_err());
            delivered = deliveries.len();
        });
        assert_eq!(delivered, 2);

        let mut notified = Vec::new();
        registry.disconnect_with(BOB, |deliveries| {
            assert!(session.try_lock().is_err());
            notified = deliveries;
        });
        assert_eq!(notified, vec![Delivery::new(ALICE, ServerEvent::OpponentDisconnected)]);
    }

    #[test]
    fn test_closed_session_refuses_late_intent() {
        let registry = paired();
        // Intent routed before the opponent left, applied after
        let (session, side) = registry.session_of(ALICE).unwrap();
        registry.disconnect(BOB);

        let mut out = Vec::new();
        run_in_session(&session, ALICE, side, &ClientIntent::EndTurn, |d| out = d);
        assert_eq!(rejection_code(&out), Some("no_active_session"));
        assert_eq!(lock(&session).state.current_player(), Side::Allies);
    }

    #[test]
    fn test_concurrent_pairing() {
        let registry = Arc::new(registry());
        let handles: Vec<_> = (0..16)
            .map(|i| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || registry.find_match(ParticipantId(100 + i), None))
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(registry.active_sessions(), 8);
        assert_eq!(registry.queue_len(), 0);
        for i in 0..16 {
            assert!(registry.view_for(ParticipantId(100 + i)).is_some());
        }
    }

    #[test]
    fn test_seeded_matches_are_reproducible() {
        let a = paired();
        let b = paired();
        assert_eq!(a.view_for(ALICE), b.view_for(ALICE));
    }
}
