use std::cell::{Cell, RefCell};
use std::rc::Rc;

use super::*;
use crate::arena::{self, Product, Stats};
use crate::event::events::OnComponentAssigned;
use crate::test_util::{self, Frozen, Health, Journal, Position, Recorder, StrictConfig, Velocity};

fn ids<'t, C: Config + 't>(entities: impl Iterator<Item = &'t Entity<C>>) -> Vec<u64> {
    entities.map(|entity| entity.id().get()).collect()
}

fn populate<C: Config>(world: &mut World<C>, count: usize) -> Vec<EntityId> {
    (0..count).map(|_| world.create()).collect()
}

#[test]
fn test_ids_are_sequential_and_resolvable() {
    test_util::init();
    let mut world = World::<StrictConfig>::new();

    let created = populate(&mut world, 3);
    assert_eq!(created, vec![EntityId::new(1), EntityId::new(2), EntityId::new(3)]);
    assert_eq!(world.count(), 3);

    for (index, &id) in created.iter().enumerate() {
        let entity = world.get_by_id(id).expect("entity was just created");
        assert_eq!(entity.id(), id);
        assert_eq!(world.get_by_index(index).map(Entity::id), Some(id));
    }

    assert!(world.get_by_id(EntityId::INVALID).is_none());
    assert!(world.get_by_id(EntityId::new(4)).is_none());
    assert!(world.get_by_index(3).is_none());
}

#[test]
fn test_ids_are_not_reused_after_deallocation() {
    test_util::init();
    let mut world = World::<StrictConfig>::new();

    let first = world.create();
    world.destroy(first, true);
    let second = world.create();

    assert!(second > first);
    assert!(world.get_by_id(first).is_none());
    assert_eq!(world.get_by_index(0).map(Entity::id), Some(second));
}

#[test]
fn test_assign_get_replace() {
    test_util::init();
    let mut world = World::<StrictConfig>::new();
    let recorder = Recorder::<OnComponentAssigned<Health>>::shared();
    world.subscribe::<OnComponentAssigned<Health>, _>(&recorder);

    let id = world.create();
    let mut entity = world.entity_mut(id).expect("entity was just created");
    assert_eq!(*entity.assign(Health(7)), Health(7));
    assert_eq!(*entity.get::<Health>(), Health(7));

    assert_eq!(*entity.assign(Health(3)), Health(3));
    assert_eq!(entity.entity().map(|entity| entity.components().len()), Some(1));

    let events = &recorder.borrow().events;
    assert_eq!(events.len(), 2);
    assert!(events.iter().all(|event| event.entity == id));
    assert_eq!(world.arena().stats()[Product::Component].allocated, 1);
}

#[test]
fn test_assign_handle_sees_subscriber_changes() {
    struct Clamp;

    impl Subscriber<OnComponentAssigned<Health>> for Clamp {
        fn receive(&mut self, world: &mut World, event: &OnComponentAssigned<Health>) {
            let mut entity = world.entity_mut(event.entity).expect("entity is alive");
            let mut health = entity.get_mut::<Health>();
            health.0 = health.0.min(100);
        }
    }

    test_util::init();
    let mut world: World = World::new();
    let clamp = Rc::new(RefCell::new(Clamp));
    world.subscribe::<OnComponentAssigned<Health>, _>(&clamp);

    let id = world.create();
    let mut entity = world.entity_mut(id).expect("entity was just created");
    assert_eq!(*entity.assign(Health(250)), Health(100));
}

#[test]
fn test_remove_semantics() {
    test_util::init();
    let mut world = World::<StrictConfig>::new();
    let recorder = Recorder::<OnComponentAssigned<Position>>::shared();
    world.subscribe::<OnComponentAssigned<Position>, _>(&recorder);

    let id = world.create();
    let mut entity = world.entity_mut(id).expect("entity was just created");
    assert!(!entity.remove::<Position>());

    entity.assign(Position { x: 1., y: 1. });
    entity.assign(Velocity::default());
    assert!(entity.remove::<Position>());
    assert!(!entity.has::<Position>());
    assert!(entity.has::<Velocity>());

    entity.remove_all();
    assert!(!entity.has::<Velocity>());

    assert_eq!(recorder.borrow().events.len(), 1);
    assert_eq!(world.arena().stats()[Product::Component].live(), 0);
}

#[test]
fn test_destroy_emits_once() {
    test_util::init();
    let mut world = World::<StrictConfig>::new();
    let recorder = Recorder::<OnEntityDestroyed>::shared();
    world.subscribe::<OnEntityDestroyed, _>(&recorder);

    let id = world.create();
    assert!(world.destroy(id, false));
    assert!(world.destroy(id, false));
    assert!(world.get_by_id(id).map_or(false, Entity::is_pending_destroy));

    assert!(world.destroy(id, true));
    assert!(world.get_by_id(id).is_none());
    assert!(!world.destroy(id, false));
    assert!(!world.destroy(id, true));

    assert_eq!(recorder.borrow().events, vec![OnEntityDestroyed { entity: id }]);
}

#[test]
fn test_destroyed_entity_is_readable_by_subscribers() {
    struct Obituary(Vec<Health>);

    impl Subscriber<OnEntityDestroyed> for Obituary {
        fn receive(&mut self, world: &mut World, event: &OnEntityDestroyed) {
            let entity = world.get_by_id(event.entity).expect("entity is deallocated after the event");
            assert!(entity.is_pending_destroy());
            self.0.push(*entity.get::<Health>());
        }
    }

    test_util::init();
    let mut world: World = World::new();
    let obituary = Rc::new(RefCell::new(Obituary(Vec::new())));
    world.subscribe::<OnEntityDestroyed, _>(&obituary);

    let id = world.create();
    world.entity_mut(id).expect("entity was just created").assign(Health(42));
    world.destroy(id, true);

    assert_eq!(obituary.borrow().0, vec![Health(42)]);
}

#[test]
fn test_immediate_destroy_keeps_index_cache() {
    test_util::init();
    let mut world = World::<StrictConfig>::new();
    let created = populate(&mut world, 5);

    world.destroy(created[1], true);
    world.destroy(created[3], true);

    assert_eq!(world.count(), 3);
    for &id in &[created[0], created[2], created[4]] {
        assert_eq!(world.get_by_id(id).map(Entity::id), Some(id));
    }
    assert_eq!(ids(world.all(true)), vec![1, 3, 5]);
    assert_eq!(world.arena().stats()[Product::Entity].live(), 3);
}

#[test]
fn test_filtered_view_respects_pending() {
    test_util::init();
    let mut world = World::<StrictConfig>::new();
    let created = populate(&mut world, 4);

    for &id in &created[..3] {
        let mut entity = world.entity_mut(id).expect("entity was just created");
        entity.assign(Position::default());
        entity.assign(Velocity::default());
    }
    world.entity_mut(created[3]).expect("entity was just created").assign(Position::default());
    world.destroy(created[1], false);

    assert_eq!(ids(world.each::<(Position, Velocity)>(false)), vec![1, 3]);
    assert_eq!(ids(world.each::<(Velocity, Position)>(true)), vec![1, 2, 3]);
    assert_eq!(ids(world.each::<(Position,)>(false)), vec![1, 3, 4]);
    assert_eq!(ids(world.all(false)), vec![1, 3, 4]);
    assert_eq!(ids(world.all(true)), vec![1, 2, 3, 4]);
    assert_eq!(world.each::<(Health,)>(true).count(), 0);
}

#[test]
fn test_position_scenario() {
    test_util::init();
    let mut world: World = World::new();
    let created = populate(&mut world, 3);

    for &id in &created[..2] {
        world.entity_mut(id).expect("entity was just created").assign(Position::default());
    }

    assert_eq!(ids(world.each::<(Position,)>(false)), vec![1, 2]);
}

#[test]
fn test_subscribe_unsubscribe_scenario() {
    test_util::init();
    let mut world: World = World::new();
    let recorder = Recorder::<OnEntityCreated>::shared();

    world.subscribe::<OnEntityCreated, _>(&recorder);
    assert_eq!(world.subscriber_count::<OnEntityCreated>(), 1);
    let first = world.create();
    assert_eq!(recorder.borrow().events, vec![OnEntityCreated { entity: first }]);

    assert_eq!(world.unsubscribe::<OnEntityCreated, _>(&recorder), 1);
    assert_eq!(world.subscriber_count::<OnEntityCreated>(), 0);
    world.create();
    assert_eq!(recorder.borrow().events.len(), 1);

    assert_eq!(world.unsubscribe::<OnEntityCreated, _>(&recorder), 0);
    assert_eq!(world.arena().stats()[Product::SubscriberList].live(), 0);
}

#[test]
fn test_subscribing_twice_delivers_twice() {
    test_util::init();
    let mut world: World = World::new();
    let recorder = Recorder::<OnEntityCreated>::shared();

    world.subscribe::<OnEntityCreated, _>(&recorder);
    world.subscribe::<OnEntityCreated, _>(&recorder);
    world.create();
    assert_eq!(recorder.borrow().events.len(), 2);

    assert_eq!(world.unsubscribe::<OnEntityCreated, _>(&recorder), 2);
}

#[test]
fn test_unsubscribe_all() {
    #[derive(Default)]
    struct Census {
        created:   usize,
        destroyed: usize,
    }

    impl Subscriber<OnEntityCreated> for Census {
        fn receive(&mut self, _: &mut World, _: &OnEntityCreated) { self.created += 1; }
    }

    impl Subscriber<OnEntityDestroyed> for Census {
        fn receive(&mut self, _: &mut World, _: &OnEntityDestroyed) { self.destroyed += 1; }
    }

    test_util::init();
    let mut world: World = World::new();
    let census = Rc::new(RefCell::new(Census::default()));
    let other = Recorder::<OnEntityCreated>::shared();

    world.subscribe::<OnEntityCreated, _>(&census);
    world.subscribe::<OnEntityDestroyed, _>(&census);
    world.subscribe::<OnEntityCreated, _>(&other);

    let id = world.create();
    world.destroy(id, false);
    assert_eq!((census.borrow().created, census.borrow().destroyed), (1, 1));

    assert_eq!(world.unsubscribe_all(&census), 2);
    assert_eq!(world.subscriber_count::<OnEntityCreated>(), 1);
    assert_eq!(world.subscriber_count::<OnEntityDestroyed>(), 0);

    let id = world.create();
    world.destroy(id, false);
    assert_eq!((census.borrow().created, census.borrow().destroyed), (1, 1));
    assert_eq!(other.borrow().events.len(), 2);
    assert_eq!(world.arena().stats()[Product::SubscriberList].live(), 1);
}

#[test]
fn test_dropped_subscriber_is_pruned() {
    test_util::init();
    let mut world: World = World::new();
    let recorder = Recorder::<OnEntityCreated>::shared();
    world.subscribe::<OnEntityCreated, _>(&recorder);
    drop(recorder);

    assert_eq!(world.subscriber_count::<OnEntityCreated>(), 0);
    world.create();
    assert_eq!(world.arena().stats()[Product::SubscriberList].live(), 0);
}

#[test]
fn test_reentrant_emit_skips_busy_subscriber() {
    #[derive(Clone)]
    struct Ping;

    struct Echo {
        received: usize,
    }

    impl Subscriber<Ping> for Echo {
        fn receive(&mut self, world: &mut World, event: &Ping) {
            self.received += 1;
            world.emit(event);
        }
    }

    test_util::init();
    let mut world: World = World::new();
    let echo = Rc::new(RefCell::new(Echo { received: 0 }));
    let recorder = Recorder::<Ping>::shared();
    world.subscribe::<Ping, _>(&echo);
    world.subscribe::<Ping, _>(&recorder);

    world.emit(&Ping);

    assert_eq!(echo.borrow().received, 1);
    // once from the outer delivery and once from the echo
    assert_eq!(recorder.borrow().events.len(), 2);
}

#[test]
fn test_subscription_during_delivery_takes_effect_later() {
    struct Recruiter {
        recruit: Rc<RefCell<Recorder<OnEntityCreated>>>,
    }

    impl Subscriber<OnEntityCreated> for Recruiter {
        fn receive(&mut self, world: &mut World, _: &OnEntityCreated) {
            world.subscribe::<OnEntityCreated, _>(&self.recruit);
        }
    }

    test_util::init();
    let mut world: World = World::new();
    let recruit = Recorder::<OnEntityCreated>::shared();
    let recruiter = Rc::new(RefCell::new(Recruiter { recruit: Rc::clone(&recruit) }));
    world.subscribe::<OnEntityCreated, _>(&recruiter);

    world.create();
    assert!(recruit.borrow().events.is_empty());

    world.unsubscribe::<OnEntityCreated, _>(&recruiter);
    let second = world.create();
    assert_eq!(recruit.borrow().events, vec![OnEntityCreated { entity: second }]);
}

#[test]
fn test_subscriber_deallocating_entity_during_assign() {
    struct Reaper;

    impl Subscriber<OnComponentAssigned<Frozen>> for Reaper {
        fn receive(&mut self, world: &mut World, event: &OnComponentAssigned<Frozen>) {
            world.destroy(event.entity, true);
        }
    }

    test_util::init();
    let mut world: World = World::new();
    let reaper = Rc::new(RefCell::new(Reaper));
    world.subscribe::<OnComponentAssigned<Frozen>, _>(&reaper);

    let id = world.create();
    let mut entity = world.entity_mut(id).expect("entity was just created");
    entity.assign(Health(1));
    assert!(!entity.assign(Frozen).is_valid());

    assert!(entity.entity().is_none());
    assert!(!entity.has::<Health>());
    assert!(!entity.remove::<Health>());
    assert_eq!(world.count(), 0);
    assert_eq!(world.arena().stats().live(), 1);
}

#[test]
#[should_panic = "Cannot assign"]
fn test_assign_to_deallocated_entity_panics() {
    test_util::init();
    let mut world: World = World::new();
    let id = world.create();
    let mut entity = world.entity_mut(id).expect("entity was just created");
    entity.world().destroy(id, true);
    entity.assign(Health(1));
}

#[test]
fn test_destroy_then_tick_cleans_up() {
    test_util::init();
    let mut world: World = World::new();
    let recorder = Recorder::<OnEntityDestroyed>::shared();
    world.subscribe::<OnEntityDestroyed, _>(&recorder);

    let created = populate(&mut world, 2);
    world.destroy(created[0], false);
    world.destroy(created[0], false);
    assert_eq!(ids(world.all(true)), vec![1, 2]);

    world.tick(0.);
    assert_eq!(ids(world.all(true)), vec![2]);
    assert_eq!(recorder.borrow().events.len(), 1);
    assert_eq!(world.arena().stats()[Product::Entity].live(), 1);
}

#[test]
fn test_tick_without_auto_cleanup() {
    test_util::init();
    let mut world = World::<StrictConfig>::new();
    let id = world.create();
    world.destroy(id, false);

    world.tick(());
    assert_eq!(world.count(), 1);

    assert!(world.cleanup());
    assert!(!world.cleanup());
    assert_eq!(world.count(), 0);
}

#[test]
fn test_reset_restarts_ids() {
    test_util::init();
    let mut world = World::<StrictConfig>::new();
    let recorder = Recorder::<OnEntityDestroyed>::shared();
    world.subscribe::<OnEntityDestroyed, _>(&recorder);

    let created = populate(&mut world, 3);
    world.entity_mut(created[0]).expect("entity was just created").assign(Health(1));
    world.destroy(created[2], false);
    recorder.borrow_mut().events.clear();

    world.reset();
    assert_eq!(world.count(), 0);
    assert_eq!(
        recorder.borrow().events,
        vec![OnEntityDestroyed { entity: created[0] }, OnEntityDestroyed { entity: created[1] }]
    );
    assert_eq!(world.arena().stats().live(), 1, "only the subscriber list remains");

    assert_eq!(world.create(), EntityId::new(1));
    world.create();
    assert_eq!(world.count(), 2);
    assert_eq!(world.subscriber_count::<OnEntityDestroyed>(), 1);
}

#[test]
fn test_cursor_tolerates_lazy_destruction() {
    test_util::init();
    let mut world = World::<StrictConfig>::new();
    let created = populate(&mut world, 3);

    let mut cursor = world.cursor::<()>(false);
    assert_eq!(cursor.next(&world), Some(created[0]));
    world.destroy(created[1], false);
    world.create();
    assert_eq!(cursor.next(&world), Some(created[2]));
    assert_eq!(cursor.next(&world), None);
    assert_eq!(cursor.remaining(), 0);
}

#[test]
#[should_panic = "Entities were deallocated while a cursor was iterating"]
fn test_cursor_panics_after_immediate_destroy() {
    test_util::init();
    let mut world = World::<StrictConfig>::new();
    let created = populate(&mut world, 3);

    let mut cursor = world.cursor::<()>(false);
    cursor.next(&world);
    world.destroy(created[2], true);
    cursor.next(&world);
}

#[test]
#[should_panic = "Entities were deallocated while a cursor was iterating"]
fn test_cursor_panics_after_cleanup() {
    test_util::init();
    let mut world = World::<StrictConfig>::new();
    let created = populate(&mut world, 2);

    let mut cursor = world.cursor::<()>(true);
    world.destroy(created[0], false);
    world.cleanup();
    cursor.next(&world);
}

#[test]
fn test_for_each_visits_only_initial_entities() {
    test_util::init();
    let mut world: World = World::new();
    populate(&mut world, 3);

    let mut visited = Vec::new();
    world.for_all(false, |mut entity| {
        visited.push(entity.id().get());
        entity.world().create();
    });

    assert_eq!(visited, vec![1, 2, 3]);
    assert_eq!(world.count(), 6);
}

#[test]
fn test_for_each_skips_lazily_destroyed() {
    test_util::init();
    let mut world: World = World::new();
    populate(&mut world, 4);

    let mut visited = Vec::new();
    world.for_all(false, |mut entity| {
        let id = entity.id();
        visited.push(id.get());
        entity.world().destroy(id.next(), false);
    });

    assert_eq!(visited, vec![1, 3]);
}

#[test]
fn test_for_each_with_signature() {
    test_util::init();
    let mut world: World = World::new();
    let created = populate(&mut world, 3);
    for &id in &created[1..] {
        let mut entity = world.entity_mut(id).expect("entity was just created");
        entity.assign(Position { x: 1., y: 1. });
        entity.assign(Velocity { dx: id.get() as f32, dy: 0. });
    }

    world.for_each::<(Position, Velocity)>(false, |mut entity| {
        entity.with_mut::<(Position, Velocity)>(|(position, velocity)| {
            position.x += velocity.dx;
        });
    });

    let xs: Vec<f32> = world.each::<(Position,)>(false).map(|entity| entity.get::<Position>().x).collect();
    assert_eq!(xs, vec![3., 4.]);
}

struct Movement;

impl System for Movement {
    fn tick(&mut self, world: &mut World, delta: &f32) {
        world.for_each::<(Position, Velocity)>(false, |mut entity| {
            entity.with_mut::<(Position, Velocity)>(|(position, velocity)| {
                position.x += velocity.dx * delta;
                position.y += velocity.dy * delta;
            });
        });
    }
}

#[test]
fn test_movement_system() {
    test_util::init();
    let mut world: World = World::new();
    let id = world.create();
    let mut entity = world.entity_mut(id).expect("entity was just created");
    entity.assign(Position { x: 0., y: 1. });
    entity.assign(Velocity { dx: 2., dy: -4. });

    world.register_system(Movement);
    world.tick(0.5);
    world.tick(0.25);

    assert_eq!(*world.get_by_id(id).expect("entity is alive").get::<Position>(), Position {
        x: 1.5,
        y: -2.
    });
}

struct Scripted {
    name:    &'static str,
    journal: Rc<Journal<String>>,
}

impl System<StrictConfig> for Scripted {
    fn configure(&mut self, _: &mut World<StrictConfig>) {
        self.journal.trace(format!("configure {}", self.name));
    }

    fn unconfigure(&mut self, _: &mut World<StrictConfig>) {
        self.journal.trace(format!("unconfigure {}", self.name));
    }

    fn tick(&mut self, _: &mut World<StrictConfig>, _: &()) {
        self.journal.trace(format!("tick {}", self.name));
    }

    fn debug_name(&self) -> &str { self.name }
}

#[test]
fn test_systems_follow_registration_order() {
    test_util::init();
    let journal = Journal::new([
        ("configure a".to_string(), "configure b".to_string()),
        ("configure b".to_string(), "tick a".to_string()),
        ("tick a".to_string(), "tick b".to_string()),
        ("tick b".to_string(), "unconfigure a".to_string()),
        ("unconfigure a".to_string(), "unconfigure b".to_string()),
    ]);

    let mut world = World::<StrictConfig>::new();
    world.register_system(Scripted { name: "a", journal: Rc::clone(&journal) });
    world.register_system(Scripted { name: "b", journal: Rc::clone(&journal) });
    assert_eq!(world.system_count(), 2);

    world.tick(());
    world.destroy_world();

    assert_eq!(journal.events().len(), 6);
}

#[test]
fn test_unregister_system_hands_it_back() {
    test_util::init();
    let journal = Journal::new([("configure a".to_string(), "unconfigure a".to_string())]);

    let mut world = World::<StrictConfig>::new();
    let id = world.register_system(Scripted { name: "a", journal: Rc::clone(&journal) });

    let system = world.unregister_system(id).expect("system is registered");
    assert_eq!(system.debug_name(), "a");
    assert!(world.unregister_system(id).is_none());
    assert_eq!(world.system_count(), 0);
    assert_eq!(world.arena().stats()[Product::System].disowned, 1);

    // not ticked after unregistration
    world.tick(());
    drop(world);
    assert_eq!(journal.events(), vec!["configure a".to_string(), "unconfigure a".to_string()]);
}

#[test]
fn test_system_unregisters_itself_during_tick() {
    struct Quitter {
        id:      Rc<Cell<Option<SystemId>>>,
        journal: Rc<Journal<&'static str>>,
    }

    impl System<StrictConfig> for Quitter {
        fn unconfigure(&mut self, _: &mut World<StrictConfig>) { self.journal.trace("unconfigure"); }

        fn tick(&mut self, world: &mut World<StrictConfig>, _: &()) {
            self.journal.trace("tick");
            let id = self.id.get().expect("id is set after registration");
            assert!(world.unregister_system(id).is_none());
            self.journal.trace("unregistered");
        }
    }

    test_util::init();
    let journal = Journal::new([("tick", "unregistered"), ("unregistered", "unconfigure")]);
    let quitter_id = Rc::new(Cell::new(None));

    let mut world = World::<StrictConfig>::new();
    let id = world.register_system(Quitter { id: Rc::clone(&quitter_id), journal: Rc::clone(&journal) });
    quitter_id.set(Some(id));
    let scripted = Journal::new([]);
    world.register_system(Scripted { name: "after", journal: Rc::clone(&scripted) });

    world.tick(());
    assert_eq!(world.system_count(), 1);
    assert_eq!(journal.events(), vec!["tick", "unregistered", "unconfigure"]);
    assert_eq!(scripted.events(), vec!["configure after".to_string(), "tick after".to_string()]);
    assert_eq!(world.arena().stats()[Product::System].released, 1);
}

#[test]
fn test_system_registered_during_tick_runs_in_same_tick() {
    struct Spawner {
        journal: Rc<Journal<String>>,
        spawned: bool,
    }

    impl System<StrictConfig> for Spawner {
        fn tick(&mut self, world: &mut World<StrictConfig>, _: &()) {
            if !self.spawned {
                self.spawned = true;
                world.register_system(Scripted { name: "late", journal: Rc::clone(&self.journal) });
            }
        }
    }

    test_util::init();
    let journal = Journal::new([("configure late".to_string(), "tick late".to_string())]);
    let mut world = World::<StrictConfig>::new();
    world.register_system(Spawner { journal: Rc::clone(&journal), spawned: false });

    world.tick(());
    assert_eq!(journal.events(), vec!["configure late".to_string(), "tick late".to_string()]);
}

#[test]
fn test_teardown() {
    test_util::init();
    let journal = Journal::new([]);
    let recorder = Recorder::<OnEntityDestroyed>::shared();

    let mut world = World::<StrictConfig>::new();
    world.subscribe::<OnEntityDestroyed, _>(&recorder);
    world.register_system(Scripted { name: "a", journal: Rc::clone(&journal) });

    let created = populate(&mut world, 3);
    world.entity_mut(created[1]).expect("entity was just created").assign(Health(1));
    world.destroy(created[0], false);
    drop(world);

    let destroyed: Vec<_> = recorder.borrow().events.iter().map(|event| event.entity).collect();
    assert_eq!(destroyed, created);
    assert_eq!(journal.events(), vec!["configure a".to_string(), "unconfigure a".to_string()]);
}

#[test]
fn test_arena_is_balanced_after_reset() {
    test_util::init();
    let mut world = World::<StrictConfig>::new();
    for id in populate(&mut world, 10) {
        let mut entity = world.entity_mut(id).expect("entity was just created");
        entity.assign(Position::default());
        entity.assign(Frozen);
    }
    world.register_system(Scripted { name: "a", journal: Journal::new([]) });

    world.reset();
    let stats = world.arena().stats();
    assert_eq!(stats[Product::Entity].live(), 0);
    assert_eq!(stats[Product::Component].live(), 0);
    assert_eq!(stats[Product::Component].allocated, 20);
    assert_eq!(stats[Product::System].live(), 1);
    assert!(world.arena().cached() > 0);
}

#[test]
fn test_world_debug() {
    test_util::init();
    let mut world = World::<StrictConfig>::new();
    let id = world.create();
    world.entity_mut(id).expect("entity was just created").assign(Health(1));
    world.register_system(Scripted { name: "scripted", journal: Journal::new([]) });

    let debug = format!("{:?}", world);
    assert!(debug.contains("health"), "{}", debug);
    assert!(debug.contains("system#1: scripted"), "{}", debug);
}

#[test]
fn test_spawning_subscriber_misses_its_own_spawns() {
    struct Breeder {
        seen: Vec<EntityId>,
    }

    impl Subscriber<OnEntityCreated> for Breeder {
        fn receive(&mut self, world: &mut World, event: &OnEntityCreated) {
            self.seen.push(event.entity);
            world.create();
        }
    }

    test_util::init();
    let mut world: World = World::new();
    let breeder = Rc::new(RefCell::new(Breeder { seen: Vec::new() }));
    let recorder = Recorder::<OnEntityCreated>::shared();
    world.subscribe::<OnEntityCreated, _>(&breeder);
    world.subscribe::<OnEntityCreated, _>(&recorder);

    let first = world.create();
    assert_eq!(breeder.borrow().seen, vec![first]);
    assert_eq!(world.count(), 2);
    assert_eq!(recorder.borrow().events.len(), 2);
}

/// Counts live objects in a cell that outlives the world.
#[derive(Default)]
struct Tally {
    heap: arena::Heap,
    live: Rc<Cell<isize>>,
}

impl Arena for Tally {
    fn allocate<T: 'static>(&mut self, product: Product, value: T) -> Box<T> {
        self.live.set(self.live.get() + 1);
        self.heap.allocate(product, value)
    }

    fn release<T: ?Sized + 'static>(&mut self, product: Product, cell: Box<T>) {
        self.live.set(self.live.get() - 1);
        self.heap.release(product, cell)
    }

    fn disown<T: ?Sized + 'static>(&mut self, product: Product, cell: Box<T>) -> Box<T> {
        self.live.set(self.live.get() - 1);
        self.heap.disown(product, cell)
    }

    fn stats(&self) -> &Stats { self.heap.stats() }
}

enum TallyConfig {}

impl Config for TallyConfig {
    type Tick = ();
    type Arena = Tally;
    type Identity = crate::identity::Reflection;
}

struct Undertaker;

impl System<TallyConfig> for Undertaker {
    fn unconfigure(&mut self, world: &mut World<TallyConfig>) {
        let id = world.create();
        world.entity_mut(id).expect("entity was just created").assign(Health(0));
    }
}

#[test]
fn test_teardown_destroys_entities_created_by_unconfigure() {
    test_util::init();
    let live = Rc::new(Cell::new(0));
    let recorder = Recorder::<OnEntityDestroyed>::shared();

    let mut world = World::<TallyConfig>::with_arena(Tally {
        heap: arena::Heap::default(),
        live: Rc::clone(&live),
    });
    world.subscribe::<OnEntityDestroyed, _>(&recorder);
    world.register_system(Undertaker);
    let first = world.create();
    drop(world);

    let destroyed: Vec<_> = recorder.borrow().events.iter().map(|event| event.entity).collect();
    assert_eq!(destroyed, vec![first, EntityId::new(2)]);
    assert_eq!(live.get(), 0);
}
