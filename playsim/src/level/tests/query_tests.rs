use math::{Fixed, Trace};

use super::fixtures::{Room, f, level_with, monster, rooms, three_rooms, walled_rooms};
use crate::level::map_defs::BBox;
use crate::thing::{MapObjFlag, MapObject, ThingId};
use crate::SimConfig;

#[test]
fn point_location_matches_room_bounds() {
    let level = three_rooms(0, 128);
    let bounds = [(0, 256), (256, 320), (320, 576)];
    for x in (3..576).step_by(7) {
        for y in (5..256).step_by(31) {
            let expected = bounds
                .iter()
                .position(|&(a, b)| x >= a && x < b)
                .unwrap();
            assert_eq!(level.map_data.point_in_sector(f(x), f(y)), expected, "({x}, {y})");
        }
    }
    // a point on a partition is in front of it
    assert_eq!(level.map_data.point_in_subsector(f(256), f(100)), 1);
}

#[test]
fn box_walk_visits_touching_subsectors() {
    let level = three_rooms(0, 128);
    let mut seen = Vec::new();
    level.map_data.subsectors_in_box(&BBox::around(f(400), f(100), f(16)), |s| {
        seen.push(s);
        true
    });
    assert_eq!(seen, vec![2]);

    seen.clear();
    level.map_data.subsectors_in_box(&BBox::around(f(290), f(100), f(48)), |s| {
        seen.push(s);
        true
    });
    seen.sort();
    assert_eq!(seen, vec![0, 1, 2]);
}

#[test]
fn trace_walk_is_near_first() {
    let level = three_rooms(0, 128);
    let mut seen = Vec::new();
    let trace = Trace::between(f(500), f(100), f(40), f(120));
    level.map_data.trace_subsectors(&trace, |s| {
        seen.push(s);
        true
    });
    assert_eq!(seen, vec![2, 1, 0]);

    seen.clear();
    let trace = Trace::between(f(340), f(10), f(500), f(200));
    level.map_data.trace_subsectors(&trace, |s| {
        seen.push(s);
        false
    });
    assert_eq!(seen, vec![2]);
}

fn in_sector_list(level: &crate::Level, id: ThingId) -> bool {
    let sector = level.thing_sector(id);
    level.sector_things(sector).any(|t| t == id)
}

fn in_block_list(level: &crate::Level, id: ThingId) -> bool {
    let t = level.thing(id);
    let blockmap = level.map_data.blockmap();
    let (bx, by) = (blockmap.block_x(t.x), blockmap.block_y(t.y));
    level.block_things(bx as usize, by as usize).any(|t| t == id)
}

#[test]
fn thing_links_round_trip() {
    let mut level = three_rooms(0, 128);
    let a = level.spawn_thing(monster(100, 100));
    let b = level.spawn_thing(monster(120, 180));
    let c = level.spawn_thing(monster(400, 100));

    for id in [a, b, c] {
        assert!(in_sector_list(&level, id));
        assert!(in_block_list(&level, id));
    }
    assert_eq!(level.thing_sector(c), 2);
    assert_eq!(level.sector_things(0).count(), 2);

    level.teleport_thing(a, f(300), f(60));
    assert_eq!(level.thing_sector(a), 1);
    assert!(in_sector_list(&level, a));
    assert!(in_block_list(&level, a));
    assert_eq!(level.sector_things(0).collect::<Vec<_>>(), vec![b]);

    // unlink and relink leaves the lists as they were
    level.unset_thing_position(b);
    assert_eq!(level.sector_things(0).count(), 0);
    level.set_thing_position(b);
    assert!(in_sector_list(&level, b));

    let removed = level.remove_thing(c).unwrap();
    assert_eq!(removed.x, f(400));
    assert_eq!(level.sector_things(2).count(), 0);
    assert!(level.remove_thing(c).is_none());
}

/// Sector and block lists through the point, head first. The back links
/// are checked to mirror the forward ones.
fn lists_at(level: &crate::Level, x: i32, y: i32) -> (Vec<ThingId>, Vec<ThingId>) {
    let blockmap = level.map_data.blockmap();
    let (bx, by) = (blockmap.block_x(f(x)) as usize, blockmap.block_y(f(y)) as usize);
    let sector: Vec<_> = level.sector_things(level.map_data.point_in_sector(f(x), f(y))).collect();
    let block: Vec<_> = level.block_things(bx, by).collect();

    check_back_links(level, &sector, |t| t.s_prev);
    check_back_links(level, &block, |t| t.b_prev);
    (sector, block)
}

fn check_back_links(level: &crate::Level, list: &[ThingId], prev: fn(&MapObject) -> Option<ThingId>) {
    if let Some(&head) = list.first() {
        assert_eq!(prev(level.thing(head)), None);
    }
    for pair in list.windows(2) {
        assert_eq!(prev(level.thing(pair[1])), Some(pair[0]));
    }
}

#[test]
fn link_then_unlink_restores_lists() {
    let mut level = three_rooms(0, 128);
    let a = level.spawn_thing(monster(100, 100));
    let b = level.spawn_thing(monster(110, 90));
    let c = level.spawn_thing(monster(90, 110));
    let before = lists_at(&level, 100, 100);
    assert_eq!(before, (vec![c, b, a], vec![c, b, a]));

    // linked at the head of both lists
    let x = level.spawn_thing(monster(105, 105));
    assert_eq!(lists_at(&level, 100, 100), (vec![x, c, b, a], vec![x, c, b, a]));
    level.unset_thing_position(x);
    assert_eq!(lists_at(&level, 100, 100), before);
    // unlinking twice does nothing
    level.unset_thing_position(x);
    assert_eq!(lists_at(&level, 100, 100), before);

    // in the middle of both lists
    level.set_thing_position(x);
    let y = level.spawn_thing(monster(95, 95));
    let z = level.spawn_thing(monster(96, 104));
    assert_eq!(lists_at(&level, 100, 100).0, vec![z, y, x, c, b, a]);
    level.unset_thing_position(x);
    assert_eq!(lists_at(&level, 100, 100), (vec![z, y, c, b, a], vec![z, y, c, b, a]));
    level.remove_thing(z);
    level.remove_thing(y);
    assert_eq!(lists_at(&level, 100, 100), before);

    // and the tail
    level.unset_thing_position(a);
    assert_eq!(lists_at(&level, 100, 100), (vec![c, b], vec![c, b]));
    level.set_thing_position(a);
    assert_eq!(lists_at(&level, 100, 100), (vec![a, c, b], vec![a, c, b]));
}

#[test]
fn block_walk_survives_changes_to_the_list() {
    let mut level = three_rooms(0, 128);
    let a = level.spawn_thing(monster(100, 100));
    let b = level.spawn_thing(monster(104, 100));
    let c = level.spawn_thing(monster(108, 100));
    assert_eq!(lists_at(&level, 104, 100).1, vec![c, b, a]);
    let range = level
        .map_data
        .blockmap()
        .range(&BBox::around(f(104), f(100), f(1)), Fixed::ZERO);

    // the next thing removed and its slot taken by a new one
    let mut visited = Vec::new();
    let mut spawned = None;
    level.blockmap_things_iter_mut(range, |level, id| {
        visited.push(id);
        if id == c {
            level.remove_thing(b);
            spawned = Some(level.spawn_thing(monster(104, 100)));
        }
        true
    });
    let d = spawned.unwrap();
    assert_eq!(d.index(), b.index());
    assert!(!level.things.contains(b));
    assert_eq!(visited, vec![c, a]);

    // the visited thing removed
    let mut visited = Vec::new();
    level.blockmap_things_iter_mut(range, |level, id| {
        visited.push(id);
        if id == d {
            level.remove_thing(d);
        }
        true
    });
    assert_eq!(visited, vec![d, c, a]);

    // the visited thing relinked at the head of the same block
    let mut visited = Vec::new();
    level.blockmap_things_iter_mut(range, |level, id| {
        visited.push(id);
        if id == c {
            level.teleport_thing(c, f(106), f(100));
        }
        true
    });
    assert_eq!(visited, vec![c, a]);
    assert_eq!(lists_at(&level, 104, 100).1, vec![c, a]);
}

#[test]
fn unlinked_flags_skip_lists() {
    let mut level = three_rooms(0, 128);
    let mut t = monster(100, 100);
    t.flags |= MapObjFlag::Nosector as u32 | MapObjFlag::Noblockmap as u32;
    let id = level.spawn_thing(t);
    assert!(!in_sector_list(&level, id));
    assert!(!in_block_list(&level, id));
    assert_eq!(level.thing(id).sector_link(), None);
    assert_eq!(level.thing(id).block_link(), None);
    // still knows where it is
    assert_eq!(level.thing_sector(id), 0);
}

#[test]
fn block_lines_visited_once() {
    let level = three_rooms(0, 128);
    let range = level
        .map_data
        .blockmap()
        .range(&BBox::around(f(288), f(128), f(400)), Fixed::ZERO);
    let mut seen = Vec::new();
    let valid = level.next_valid_count();
    level.blockmap_lines_iter(range, valid, |l, _| {
        seen.push(l);
        true
    });
    let count = seen.len();
    seen.sort();
    seen.dedup();
    assert_eq!(seen.len(), count);
    assert_eq!(count, level.map_data.linedefs().len());
}

#[test]
fn sight_in_open_rooms() {
    let mut level = three_rooms(0, 128);
    let a = level.spawn_thing(monster(100, 100));
    let b = level.spawn_thing(monster(500, 140));
    assert!(level.check_sight(a, b));
    assert!(level.check_sight(b, a));
}

#[test]
fn sight_blocked_by_wall() {
    let mut level = walled_rooms();
    let a = level.spawn_thing(monster(100, 100));
    let b = level.spawn_thing(monster(400, 100));
    assert!(!level.check_sight(a, b));
}

#[test]
fn sight_blocked_by_closed_door() {
    let mut level = three_rooms(0, 0);
    let a = level.spawn_thing(monster(100, 100));
    let b = level.spawn_thing(monster(400, 100));
    assert!(!level.check_sight(a, b));
}

#[test]
fn sight_over_ledge() {
    // a raised middle floor hides things standing behind it
    let mut level = three_rooms(100, 128);
    let a = level.spawn_thing(monster(100, 100));
    let b = level.spawn_thing(monster(400, 100));
    assert!(!level.check_sight(a, b));

    // a short step does not
    let mut level = three_rooms(16, 128);
    let a = level.spawn_thing(monster(100, 100));
    let b = level.spawn_thing(monster(400, 100));
    assert!(level.check_sight(a, b));
}

#[test]
fn reject_only_when_enabled() {
    let map = || {
        let mut b = rooms(&[
            Room::new(256, 0, 128),
            Room::new(64, 0, 128),
            Room::new(256, 0, 128),
        ]);
        // sector 0 can't see sector 2
        b.reject(vec![0b0000_0100, 0]);
        b
    };

    let mut level = level_with(map(), SimConfig::default());
    let a = level.spawn_thing(monster(100, 100));
    let b = level.spawn_thing(monster(400, 100));
    assert!(level.check_sight(a, b));

    let config = SimConfig {
        use_reject: true,
        ..Default::default()
    };
    let mut level = level_with(map(), config);
    let a = level.spawn_thing(monster(100, 100));
    let b = level.spawn_thing(monster(400, 100));
    // a rejected pair never starts a trace
    let count = level.valid_count();
    assert!(!level.check_sight(a, b));
    assert_eq!(level.valid_count(), count);
    // only the one direction is rejected
    assert!(level.check_sight(b, a));
    assert_eq!(level.valid_count(), count + 1);
}
