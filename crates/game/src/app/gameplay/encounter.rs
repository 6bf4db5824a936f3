/// Player-initiated: every active enemy whose anchor lies within
/// `ATTACK_RADIUS` of the player's anchor is deactivated.
fn resolve_attack(actors: &mut [Actor], events: &mut TickEvents) {
    let Some((player, enemies)) = actors.split_first_mut() else {
        return;
    };
    let origin = player.body.position;
    for (offset, enemy) in enemies.iter_mut().enumerate() {
        if !enemy.is_active_enemy() {
            continue;
        }
        if enemy.body.position.distance(origin) <= ATTACK_RADIUS {
            enemy.body.deactivate();
            events
                .defeated_enemies
                .push((offset + 1, DefeatCause::Attack));
        }
    }
}

/// Runs after movement. Every active enemy overlapping the player is
/// deactivated, and any overlap takes the player down too.
fn resolve_contacts(actors: &mut [Actor], events: &mut TickEvents) {
    let Some((player, enemies)) = actors.split_first_mut() else {
        return;
    };
    if !player.is_active() {
        return;
    }
    let player_bounds = player.body.bounds();
    for (offset, enemy) in enemies.iter_mut().enumerate() {
        if !enemy.is_active_enemy() {
            continue;
        }
        if player_bounds.intersects(&enemy.body.bounds()) {
            enemy.body.deactivate();
            events
                .defeated_enemies
                .push((offset + 1, DefeatCause::Contact));
            events.player_defeated = true;
        }
    }
    if events.player_defeated {
        player.body.deactivate();
    }
}
