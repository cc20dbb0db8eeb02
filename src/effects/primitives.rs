//! Board primitives.
//!
//! Each primitive performs one kind of board change, recomputes lane
//! values, and then runs the change's aftermath in a fixed order:
//!
//! 1. the matching reactive event
//! 2. bottom-box uncover checks for every card the change left on top
//! 3. the chained follow-up, if its condition holds
//!
//! Any of these may suspend; whatever is left is filed on the continuation
//! record by [`Engine::run_work`].

use smallvec::SmallVec;
use tracing::debug;

use crate::cards::Card;
use crate::core::{Animation, CardId, CardLocation, GameState, PlayerId, LANE_COUNT};
use crate::rules::{values, Engine};
use crate::stack::{Chained, QueuedAction};
use crate::triggers::{GameEvent, ReactiveTrigger};

use super::effect::{BoxSlot, EffectTrigger};

/// The uncovered card of every lane, indexed by player then lane.
pub(crate) type Tops = [[Option<CardId>; LANE_COUNT]; 2];

/// Snapshot the top of every lane.
pub(crate) fn tops(state: &GameState) -> Tops {
    let mut out = [[None; LANE_COUNT]; 2];
    for (player, side) in state.sides.iter() {
        for lane in 0..LANE_COUNT {
            out[player.index()][lane] = side.uncovered(lane).map(|c| c.id);
        }
    }
    out
}

/// Uncover checks for every lane whose top changed to a card that was
/// already in the lane. `arrived` is a card that moved in and so was not
/// uncovered by the change.
pub(crate) fn uncover_work(
    state: &GameState,
    before: &Tops,
    arrived: Option<CardId>,
) -> Vec<QueuedAction> {
    let after = tops(state);
    let mut work = Vec::new();
    for player in PlayerId::all() {
        for lane in 0..LANE_COUNT {
            let now = after[player.index()][lane];
            let Some(card) = now else {
                continue;
            };
            if now != before[player.index()][lane] && now != arrived {
                work.push(QueuedAction::Fire {
                    card,
                    slot: BoxSlot::Bottom,
                    trigger: EffectTrigger::OnUncover,
                });
            }
        }
    }
    work
}

fn follow_up(chained: Option<Chained>, affected: usize) -> Option<QueuedAction> {
    chained.and_then(|c| c.into_work(affected))
}

/// The lane every located card shares, if they all share one.
fn common_lane(locations: &[CardLocation]) -> Option<usize> {
    let first = locations.first()?.lane;
    locations.iter().all(|loc| loc.lane == first).then_some(first)
}

fn removal_event(
    kind: ReactiveTrigger,
    actor: PlayerId,
    removed: &[(CardId, CardLocation)],
) -> GameEvent {
    let locations: SmallVec<[CardLocation; 4]> = removed.iter().map(|(_, loc)| *loc).collect();
    let mut event = GameEvent::new(kind, actor).with_count(removed.len());
    if let Some(lane) = common_lane(&locations) {
        event = event.with_lane(lane);
    }
    if let [(card, _)] = removed {
        event = event.with_card(*card);
    }
    event
}

impl Engine {
    pub(crate) fn recalculate_in_place(&self, state: &mut GameState) {
        values::recalculate(state, &self.config);
    }

    /// Work that covers the top card of `lane`: its on-cover text, then the
    /// card-scoped cover event.
    pub(crate) fn cover_work(
        &self,
        state: &GameState,
        owner: PlayerId,
        lane: usize,
        actor: PlayerId,
    ) -> Vec<QueuedAction> {
        let Some(top) = state.side(owner).uncovered(lane) else {
            return Vec::new();
        };
        vec![
            QueuedAction::Fire {
                card: top.id,
                slot: BoxSlot::Bottom,
                trigger: EffectTrigger::OnCover,
            },
            QueuedAction::Reactive(
                GameEvent::new(ReactiveTrigger::OnCoverOrFlip, actor)
                    .with_card(top.id)
                    .with_lane(lane),
            ),
        ]
    }

    fn take_from_board(&self, state: &mut GameState, card: CardId) -> Option<(Card, CardLocation)> {
        let location = state.locate(card)?;
        let taken = state.side_mut(location.owner).lanes[location.lane].remove(location.index);
        Some((taken, location))
    }

    /// Send board cards to their owners' discard piles.
    pub fn delete_cards(
        &self,
        state: &mut GameState,
        targets: &[CardId],
        actor: PlayerId,
        chained: Option<Chained>,
    ) -> usize {
        let before = tops(state);
        let mut removed = Vec::new();
        for &id in targets {
            let Some((mut card, location)) = self.take_from_board(state, id) else {
                continue;
            };
            state.log.append(Some(actor), format!("{} deletes {}", actor, card.name()));
            card.reset_for_zone_change();
            state.push_animation(Animation::Delete { card: id, owner: location.owner });
            state.side_mut(location.owner).discard.push_back(card);
            removed.push((id, location));
        }
        self.finish_removal(state, ReactiveTrigger::AfterDelete, actor, &removed, &before, chained)
    }

    /// Send board cards back to their owners' hands.
    pub fn return_cards(
        &self,
        state: &mut GameState,
        targets: &[CardId],
        actor: PlayerId,
        chained: Option<Chained>,
    ) -> usize {
        let before = tops(state);
        let mut removed = Vec::new();
        for &id in targets {
            let Some((mut card, location)) = self.take_from_board(state, id) else {
                continue;
            };
            state.log.append(Some(actor), format!("{} returns {} to hand", actor, card.name()));
            card.reset_for_zone_change();
            state.push_animation(Animation::Return { card: id, owner: location.owner });
            state.side_mut(location.owner).hand.push_back(card);
            removed.push((id, location));
        }
        self.finish_removal(state, ReactiveTrigger::AfterReturn, actor, &removed, &before, chained)
    }

    fn finish_removal(
        &self,
        state: &mut GameState,
        kind: ReactiveTrigger,
        actor: PlayerId,
        removed: &[(CardId, CardLocation)],
        before: &Tops,
        chained: Option<Chained>,
    ) -> usize {
        let count = removed.len();
        if count > 0 {
            let stats = &mut state.side_mut(actor).stats;
            match kind {
                ReactiveTrigger::AfterReturn => stats.cards_returned += count as u32,
                _ => stats.cards_deleted += count as u32,
            }
            self.recalculate_in_place(state);
        }

        let mut work = Vec::new();
        if count > 0 {
            work.push(QueuedAction::Reactive(removal_event(kind, actor, removed)));
            work.extend(uncover_work(state, before, None));
        }
        work.extend(follow_up(chained, count));
        self.run_work(state, work);
        count
    }

    /// Turn board cards over.
    ///
    /// A card flipped face-up while uncovered resolves its on-play text.
    pub fn flip_cards(
        &self,
        state: &mut GameState,
        targets: &[CardId],
        actor: PlayerId,
        chained: Option<Chained>,
    ) -> usize {
        let mut flipped = Vec::new();
        for &id in targets {
            let Some(location) = state.locate(id) else {
                continue;
            };
            let uncovered = state.is_uncovered(location);
            let Some(card) = state.card_at_mut(location) else {
                continue;
            };
            card.face_up = !card.face_up;
            let face_up = card.face_up;
            let name = card.name();
            state.log.append(
                Some(actor),
                format!("{} flips {} face-{}", actor, name, if face_up { "up" } else { "down" }),
            );
            state.push_animation(Animation::Flip { card: id, owner: location.owner, face_up });
            flipped.push((id, location, face_up, uncovered));
        }

        let count = flipped.len();
        let mut work = Vec::new();
        if count > 0 {
            state.side_mut(actor).stats.cards_flipped += count as u32;
            self.recalculate_in_place(state);

            let locations: Vec<CardLocation> = flipped.iter().map(|(_, loc, _, _)| *loc).collect();
            let mut event = GameEvent::new(ReactiveTrigger::AfterFlip, actor).with_count(count);
            if let Some(lane) = common_lane(&locations) {
                event = event.with_lane(lane);
            }
            if let [(card, ..)] = flipped.as_slice() {
                event = event.with_card(*card);
            }
            work.push(QueuedAction::Reactive(event));

            for (card, location, face_up, uncovered) in flipped {
                work.push(QueuedAction::Reactive(
                    GameEvent::new(ReactiveTrigger::OnCoverOrFlip, actor)
                        .with_card(card)
                        .with_lane(location.lane),
                ));
                if face_up && uncovered {
                    work.push(QueuedAction::Fire {
                        card,
                        slot: BoxSlot::Middle,
                        trigger: EffectTrigger::OnPlay,
                    });
                }
            }
        }
        work.extend(follow_up(chained, count));
        self.run_work(state, work);
        count
    }

    /// Start shifting a card: cover the destination's top card, then move.
    pub(crate) fn begin_shift(
        &self,
        state: &mut GameState,
        card: CardId,
        to: usize,
        actor: PlayerId,
        chained: Option<Chained>,
    ) {
        let mut work = match state.locate(card) {
            Some(location) => self.cover_work(state, location.owner, to, actor),
            None => Vec::new(),
        };
        work.push(QueuedAction::Shift { card, to, actor, chained });
        self.run_work(state, work);
    }

    /// Move a card onto another lane of its owner's side.
    pub(crate) fn move_card(
        &self,
        state: &mut GameState,
        card: CardId,
        to: usize,
        actor: PlayerId,
        chained: Option<Chained>,
    ) {
        let before = tops(state);
        let moved = match state.locate(card) {
            Some(location) if location.lane != to => self.take_from_board(state, card),
            _ => None,
        };
        let Some((moved, location)) = moved else {
            self.run_work(state, follow_up(chained, 0).into_iter().collect());
            return;
        };

        state.log.append(
            Some(actor),
            format!("{} shifts {} from lane {} to lane {}", actor, moved, location.lane, to),
        );
        state.side_mut(location.owner).lanes[to].push_back(moved);
        state.side_mut(actor).stats.cards_shifted += 1;
        state.push_animation(Animation::Shift {
            card,
            owner: location.owner,
            from: location.lane,
            to,
        });
        self.recalculate_in_place(state);

        let mut work = vec![QueuedAction::Reactive(
            GameEvent::new(ReactiveTrigger::AfterShift, actor)
                .with_card(card)
                .with_lane(to),
        )];
        work.extend(uncover_work(state, &before, Some(card)));
        work.extend(follow_up(chained, 1));
        self.run_work(state, work);
    }

    /// Take the top card of a deck, reshuffling the discard pile into an
    /// empty deck when the rules allow it.
    pub(crate) fn take_top_of_deck(&self, state: &mut GameState, player: PlayerId) -> Option<Card> {
        if state.side(player).deck.is_empty() && self.config.refill_deck_from_discard {
            let discard = std::mem::take(&mut state.side_mut(player).discard);
            if !discard.is_empty() {
                let shuffled = state.rng.shuffled(&discard);
                debug!(%player, cards = shuffled.len(), "refill deck from discard");
                let text = format!("{} shuffles their discard pile into their deck", player);
                state.log.append(Some(player), text);
                state.side_mut(player).deck = shuffled;
            }
        }
        state.side_mut(player).deck.pop_back()
    }

    /// Draw up to `count` cards. Returns the cards drawn.
    pub(crate) fn draw_cards(
        &self,
        state: &mut GameState,
        player: PlayerId,
        count: usize,
    ) -> Vec<CardId> {
        let mut drawn = Vec::with_capacity(count);
        for _ in 0..count {
            let Some(card) = self.take_top_of_deck(state, player) else {
                break;
            };
            drawn.push(card.id);
            state.side_mut(player).hand.push_back(card);
        }
        if !drawn.is_empty() {
            state.side_mut(player).stats.cards_drawn += drawn.len() as u32;
            state.log.append(Some(player), format!("{} draws {}", player, drawn.len()));
            state.push_animation(Animation::Draw { owner: player, cards: drawn.clone() });
        }
        drawn
    }

    /// Draw as an effect step: draw, then the draw event and follow-up.
    pub fn draw_step(
        &self,
        state: &mut GameState,
        player: PlayerId,
        count: usize,
        chained: Option<Chained>,
    ) -> usize {
        let drawn = self.draw_cards(state, player, count).len();
        let mut work = Vec::new();
        if drawn > 0 {
            work.push(QueuedAction::Reactive(
                GameEvent::new(ReactiveTrigger::AfterDraw, player).with_count(drawn),
            ));
        }
        work.extend(follow_up(chained, drawn));
        self.run_work(state, work);
        drawn
    }

    /// Move cards from a hand to the discard pile. Unknown IDs are skipped.
    pub(crate) fn discard_from_hand(
        &self,
        state: &mut GameState,
        player: PlayerId,
        cards: &[CardId],
    ) -> Vec<CardId> {
        let mut discarded = Vec::new();
        for &id in cards {
            let Some(position) = state.side(player).hand_position(id) else {
                continue;
            };
            let mut card = state.side_mut(player).hand.remove(position);
            card.reset_for_zone_change();
            state.log.append(Some(player), format!("{} discards {}", player, card.name()));
            state.side_mut(player).discard.push_back(card);
            discarded.push(id);
        }
        if !discarded.is_empty() {
            state.side_mut(player).stats.cards_discarded += discarded.len() as u32;
            state.push_animation(Animation::Discard { owner: player, cards: discarded.clone() });
        }
        discarded
    }

    /// Discard as an effect step.
    pub fn discard_step(
        &self,
        state: &mut GameState,
        player: PlayerId,
        cards: &[CardId],
        chained: Option<Chained>,
    ) -> usize {
        let discarded = self.discard_from_hand(state, player, cards).len();
        let mut work = Vec::new();
        if discarded > 0 {
            work.push(QueuedAction::Reactive(
                GameEvent::new(ReactiveTrigger::AfterDiscard, player).with_count(discarded),
            ));
        }
        work.extend(follow_up(chained, discarded));
        self.run_work(state, work);
        discarded
    }

    /// Show a hand to the other player.
    pub fn reveal_hand(
        &self,
        state: &mut GameState,
        player: PlayerId,
        chained: Option<Chained>,
    ) -> usize {
        let mut names = Vec::new();
        let mut ids = Vec::new();
        for card in state.side_mut(player).hand.iter_mut() {
            card.revealed = true;
            names.push(card.name());
            ids.push(card.id);
        }
        let count = ids.len();
        if count > 0 {
            let text = format!("{} reveals their hand: {}", player, names.join(", "));
            state.log.append(Some(player), text);
            state.push_animation(Animation::Reveal { owner: player, cards: ids });
        }
        self.run_work(state, follow_up(chained, count).into_iter().collect());
        count
    }

    /// Exchange two protocol labels on one side.
    pub fn swap_protocols(
        &self,
        state: &mut GameState,
        side: PlayerId,
        a: usize,
        b: usize,
        chained: Option<Chained>,
    ) -> usize {
        state.side_mut(side).protocols.swap(a, b);
        let protocols = &state.side(side).protocols;
        let text = format!("{} swaps protocols {} and {}", side, protocols[b], protocols[a]);
        state.log.append(Some(side), text);
        self.recalculate_in_place(state);
        self.run_work(state, follow_up(chained, 1).into_iter().collect());
        1
    }

    /// Put a card on top of a lane, raise the play event, then run its
    /// on-play checks.
    pub(crate) fn place_card(
        &self,
        state: &mut GameState,
        owner: PlayerId,
        lane: usize,
        mut card: Card,
        face_up: bool,
    ) {
        card.face_up = face_up;
        let id = card.id;
        let text = if face_up {
            format!("{} plays {} into lane {}", owner, card.name(), lane)
        } else {
            format!("{} plays a card face-down into lane {}", owner, lane)
        };
        state.log.append(Some(owner), text);
        state.side_mut(owner).lanes[lane].push_back(card);
        state.side_mut(owner).stats.cards_played += 1;
        state.push_animation(Animation::Play { card: id, owner, lane });
        self.recalculate_in_place(state);

        self.run_work(
            state,
            vec![
                QueuedAction::Reactive(
                    GameEvent::new(ReactiveTrigger::AfterPlay, owner)
                        .with_card(id)
                        .with_lane(lane),
                ),
                QueuedAction::Fire {
                    card: id,
                    slot: BoxSlot::Middle,
                    trigger: EffectTrigger::OnPlay,
                },
            ],
        );
    }

    /// Play the top card of a deck face-down into each of `lanes`.
    pub fn play_from_deck(
        &self,
        state: &mut GameState,
        player: PlayerId,
        lanes: &[usize],
        chained: Option<Chained>,
    ) -> usize {
        let mut work = Vec::new();
        let mut placed = 0;
        for &lane in lanes {
            let Some(card) = self.take_top_of_deck(state, player) else {
                break;
            };
            work.extend(self.cover_work(state, player, lane, player));
            work.push(QueuedAction::Place { owner: player, lane, card, face_up: false });
            placed += 1;
        }
        work.extend(follow_up(chained, placed));
        self.run_work(state, work);
        placed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::CardEffects;
    use crate::core::{PlayerMap, RulesConfig, Side};

    fn board() -> GameState {
        let sides = PlayerMap::new(|_| Side::new(["Fire", "Water", "Spirit"]));
        GameState::new(sides, PlayerId::FIRST, 5)
    }

    #[test]
    fn test_delete_moves_to_owner_discard() {
        let engine = Engine::default();
        let mut state = board();
        let theirs = state.add_to_lane(PlayerId::SECOND, 0, "Fire", 4, false, CardEffects::Builtin);

        let n = engine.delete_cards(&mut state, &[theirs, CardId(77)], PlayerId::FIRST, None);

        assert_eq!(n, 1);
        let side = state.side(PlayerId::SECOND);
        assert!(side.lanes[0].is_empty());
        assert_eq!(side.discard.len(), 1);
        assert!(side.discard[0].face_up);
        assert_eq!(state.side(PlayerId::FIRST).stats.cards_deleted, 1);
        assert_eq!(state.animations().len(), 1);
    }

    #[test]
    fn test_uncover_work_skips_arrivals() {
        let mut state = board();
        let bottom = state.add_to_lane(PlayerId::FIRST, 0, "Fire", 1, true, CardEffects::Builtin);
        let top = state.add_to_lane(PlayerId::FIRST, 0, "Fire", 2, true, CardEffects::Builtin);
        let before = tops(&state);

        state.side_mut(PlayerId::FIRST).lanes[0].pop_back();
        let work = uncover_work(&state, &before, None);
        assert_eq!(
            work,
            vec![QueuedAction::Fire {
                card: bottom,
                slot: BoxSlot::Bottom,
                trigger: EffectTrigger::OnUncover,
            }]
        );

        let before = tops(&state);
        let mut moved = state.create_card("Water", 3, CardEffects::Builtin);
        moved.id = top;
        state.side_mut(PlayerId::FIRST).lanes[1].push_back(moved);
        assert!(uncover_work(&state, &before, Some(top)).is_empty());
    }

    #[test]
    fn test_draw_refills_from_discard() {
        let engine = Engine::new(RulesConfig::default());
        let mut state = board();
        let card = state.create_card("Spirit", 1, CardEffects::Builtin);
        state.side_mut(PlayerId::FIRST).discard.push_back(card);

        let drawn = engine.draw_cards(&mut state, PlayerId::FIRST, 2);

        assert_eq!(drawn.len(), 1);
        assert!(state.side(PlayerId::FIRST).discard.is_empty());
        assert!(state.log.contains("shuffles their discard pile"));
    }

    #[test]
    fn test_draw_without_refill() {
        let config = RulesConfig { refill_deck_from_discard: false, ..RulesConfig::default() };
        let engine = Engine::new(config);
        let mut state = board();
        let card = state.create_card("Spirit", 1, CardEffects::Builtin);
        state.side_mut(PlayerId::FIRST).discard.push_back(card);

        assert!(engine.draw_cards(&mut state, PlayerId::FIRST, 1).is_empty());
        assert_eq!(state.side(PlayerId::FIRST).discard.len(), 1);
    }

    #[test]
    fn test_flip_and_shift() {
        let engine = Engine::default();
        let mut state = board();
        let card = state.add_to_lane(PlayerId::FIRST, 0, "Fire", 5, false, CardEffects::Builtin);

        assert_eq!(engine.flip_cards(&mut state, &[card], PlayerId::FIRST, None), 1);
        assert!(state.board_card(card).unwrap().face_up);
        assert_eq!(state.side(PlayerId::FIRST).lane_values[0], 5);

        engine.begin_shift(&mut state, card, 2, PlayerId::FIRST, None);
        assert_eq!(state.locate(card).map(|l| l.lane), Some(2));
        assert_eq!(state.side(PlayerId::FIRST).lane_values, [0, 0, 5]);
        assert_eq!(state.side(PlayerId::FIRST).stats.cards_shifted, 1);
    }

    #[test]
    fn test_swap_protocols() {
        let engine = Engine::default();
        let mut state = board();

        engine.swap_protocols(&mut state, PlayerId::SECOND, 0, 2, None);

        let expected = ["Spirit", "Water", "Fire"].map(String::from);
        assert_eq!(state.side(PlayerId::SECOND).protocols, expected);
        assert_eq!(state.side(PlayerId::FIRST).protocols[0], "Fire");
    }
}
