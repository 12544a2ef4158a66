use math::{Angle, Fixed};

use super::fixtures::{Event, Recorder, Room, f, level, monster, player, rooms, three_rooms, walled_rooms};
use crate::doom_def::{MISSILERANGE, ONFLOORZ};
use crate::thing::{MapObjFlag, MapObject};

fn range() -> Fixed {
    f(MISSILERANGE)
}

#[test]
fn shot_puffs_on_wall() {
    let mut level = walled_rooms();
    let shooter = level.spawn_thing(monster(128, 128));
    // the other side of the wall doesn't take it
    let hidden = level.spawn_thing(monster(400, 128));

    let mut hooks = Recorder::default();
    let impact = level.line_attack(shooter, Angle::new(0), range(), None, 10, &mut hooks);
    assert_eq!(hooks.events, vec![Event::Puff]);
    assert_eq!(hooks.damage_to(hidden), 0);
    assert_eq!(impact.thing, None);
    assert_eq!(impact.line, Some(2));
    // pulled back off the wall
    assert!(impact.x > f(250) && impact.x < f(253), "x {}", impact.x);
    assert_eq!(impact.y.to_int(), 128);
}

#[test]
fn shot_hits_thing_through_open_lines() {
    let mut level = three_rooms(0, 128);
    let shooter = level.spawn_thing(monster(100, 128));
    let target = level.spawn_thing(monster(400, 128));

    let mut hooks = Recorder::default();
    let impact = level.line_attack(shooter, Angle::new(0), range(), None, 10, &mut hooks);
    assert_eq!(impact.thing, Some(target));
    assert_eq!(
        hooks.events,
        vec![
            Event::Blood(10),
            Event::Damage {
                target,
                inflictor: Some(shooter),
                source: Some(shooter),
                damage: 10,
            },
        ]
    );
    assert!(impact.x < f(400));
}

#[test]
fn bloodless_things_puff() {
    let mut level = three_rooms(0, 128);
    let shooter = level.spawn_thing(monster(100, 128));
    let mut t = monster(400, 128);
    t.set_flag(MapObjFlag::Noblood);
    let target = level.spawn_thing(t);

    let mut hooks = Recorder::default();
    level.line_attack(shooter, Angle::new(0), range(), None, 10, &mut hooks);
    assert_eq!(hooks.events[0], Event::Puff);
    assert_eq!(hooks.damage_to(target), 10);
}

#[test]
fn shot_passes_corpses() {
    let mut level = walled_rooms();
    let shooter = level.spawn_thing(monster(64, 128));
    let mut corpse = monster(160, 128);
    corpse.flags = MapObjFlag::Corpse as u32;
    level.spawn_thing(corpse);

    let mut hooks = Recorder::default();
    let impact = level.line_attack(shooter, Angle::new(0), range(), None, 10, &mut hooks);
    assert_eq!(impact.line, Some(2));
    assert_eq!(hooks.events, vec![Event::Puff]);
}

#[test]
fn shot_is_kept_to_given_slope() {
    let mut level = three_rooms(0, 128);
    let shooter = level.spawn_thing(monster(100, 128));
    let target = level.spawn_thing(monster(400, 128));

    // straight up and over the target
    let mut hooks = Recorder::default();
    let impact = level.line_attack(shooter, Angle::new(0), range(), Some(Fixed::ONE), 10, &mut hooks);
    assert_eq!(impact.thing, None);
    assert_eq!(hooks.damage_to(target), 0);
}

#[test]
fn aim_finds_target() {
    let mut level = three_rooms(0, 128);
    let shooter = level.spawn_thing(monster(100, 128));
    let target = level.spawn_thing(monster(400, 128));

    let (slope, found) = level.aim_line_attack(shooter, Angle::new(0), range());
    assert_eq!(found, Some(target));
    // the shot starts above the middle of an equal height target
    assert!(slope < Fixed::ZERO);

    // which line_attack then hits
    let mut hooks = Recorder::default();
    let impact = level.line_attack(shooter, Angle::new(0), range(), Some(slope), 5, &mut hooks);
    assert_eq!(impact.thing, Some(target));
    assert_eq!(hooks.damage_to(target), 5);

    let (slope, found) = level.aim_line_attack(shooter, Angle::from_degrees(180.0), range());
    assert_eq!((slope, found), (Fixed::ZERO, None));
}

#[test]
fn aim_stops_at_closed_door() {
    let mut level = three_rooms(0, 0);
    let shooter = level.spawn_thing(monster(100, 128));
    level.spawn_thing(monster(400, 128));
    let (slope, found) = level.aim_line_attack(shooter, Angle::new(0), range());
    assert_eq!((slope, found), (Fixed::ZERO, None));
}

#[test]
fn shooting_a_special_line() {
    let mut level = level(rooms(&[
        Room::new(256, 0, 128),
        Room::new(64, 0, 0).special(7),
        Room::new(256, 0, 128),
    ]));
    let shooter = level.spawn_thing(monster(100, 128));
    let mut hooks = Recorder::default();
    let impact = level.line_attack(shooter, Angle::new(0), range(), None, 10, &mut hooks);
    assert_eq!(impact.line, Some(0));
    assert_eq!(hooks.events, vec![Event::Shoot(0), Event::Puff]);
}

#[test]
fn sky_takes_shots_silently() {
    let map = |sky: bool| {
        let hall = Room::new(256, 0, 128);
        let hall = if sky { hall.sky() } else { hall };
        level(rooms(&[hall, Room::new(256, 0, 128).walled()]))
    };

    // aimed high, the wall is hit above the sky ceiling
    let mut level = map(true);
    let shooter = level.spawn_thing(monster(128, 128));
    let mut hooks = Recorder::default();
    let impact = level.line_attack(shooter, Angle::new(0), range(), Some(Fixed::ONE), 10, &mut hooks);
    assert_eq!(impact.line, Some(2));
    assert!(impact.z > f(128));
    assert!(hooks.events.is_empty());

    let mut level = map(false);
    let shooter = level.spawn_thing(monster(128, 128));
    let mut hooks = Recorder::default();
    level.line_attack(shooter, Angle::new(0), range(), Some(Fixed::ONE), 10, &mut hooks);
    assert_eq!(hooks.events, vec![Event::Puff]);
}

fn blast(x: i32, y: i32) -> MapObject {
    MapObject::new(f(x), f(y), ONFLOORZ, f(8), f(16), MapObjFlag::Noblockmap as u32)
}

#[test]
fn radius_attack_falls_off() {
    let mut level = walled_rooms();
    let spot = level.spawn_thing(blast(230, 128));
    let near = level.spawn_thing(monster(160, 128));
    let far = level.spawn_thing(monster(30, 128));
    let behind = level.spawn_thing(monster(300, 128));
    let source = level.spawn_thing(player(100, 200));

    let mut hooks = Recorder::default();
    level.radius_attack(spot, Some(source), 128, &mut hooks);

    // 70 away, less its radius
    assert!(hooks.events.contains(&Event::Damage {
        target: near,
        inflictor: Some(spot),
        source: Some(source),
        damage: 78,
    }));
    assert_eq!(hooks.damage_to(far), 0);
    assert_eq!(hooks.damage_to(behind), 0);
    // 130 away by the larger axis
    assert_eq!(hooks.damage_to(source), 128 - (130 - 16));
}

#[test]
fn radius_attack_standing_inside() {
    let mut level = three_rooms(0, 128);
    let spot = level.spawn_thing(blast(100, 100));
    let victim = level.spawn_thing(monster(110, 100));
    let mut hooks = Recorder::default();
    level.radius_attack(spot, None, 64, &mut hooks);
    assert_eq!(hooks.damage_to(victim), 64);
}

#[test]
fn use_activates_nearest_special() {
    let mut level = level(rooms(&[
        Room::new(256, 0, 128),
        Room::new(64, 0, 0).special(1),
        Room::new(256, 0, 128),
    ]));
    let user = level.spawn_thing(player(200, 128));
    let mut hooks = Recorder::default();
    level.use_lines(user, &mut hooks);
    assert_eq!(hooks.events, vec![Event::Use { line: 0, side: 1 }]);

    // facing away there is nothing in reach
    level.thing_mut(user).angle = Angle::from_degrees(180.0);
    hooks.events.clear();
    level.use_lines(user, &mut hooks);
    assert!(hooks.events.is_empty());
}

#[test]
fn use_on_plain_wall() {
    let mut level = walled_rooms();
    let user = level.spawn_thing(player(200, 128));
    let mut hooks = Recorder::default();
    level.use_lines(user, &mut hooks);
    assert_eq!(hooks.events, vec![Event::NoWay]);
}

#[test]
fn use_looks_through_open_lines() {
    let mut level = three_rooms(0, 128);
    let user = level.spawn_thing(player(200, 128));
    let mut hooks = Recorder::default();
    level.use_lines(user, &mut hooks);
    assert!(hooks.events.is_empty());
}
