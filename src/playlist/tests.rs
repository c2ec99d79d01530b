use super::*;
use crate::model::{ItemRef, same_item};
use crate::testing::{ScriptedLibrary, song};

fn titles(items: &[ItemRef]) -> Vec<String> {
    items.iter().map(|i| i.song().title.clone()).collect()
}

fn playlist_of(names: &[&str]) -> Playlist {
    let mut p = Playlist::new();
    for n in names {
        p.enqueue(song(n), Vec::new());
    }
    p
}

fn query(current: Option<&ItemRef>) -> NextQuery<'_> {
    NextQuery {
        random: false,
        current,
        fallback_to_library: false,
        remove_after_fetch: false,
    }
}

#[test]
fn enqueue_keeps_insertion_order() {
    let mut p = Playlist::new();
    p.enqueue(song("A"), Vec::new());
    p.enqueue(song("B"), Vec::new());
    p.enqueue(song("A"), Vec::new());
    assert_eq!(p.len(), 3);
    assert_eq!(titles(p.items()), ["A", "B", "A"]);
    assert!(!same_item(&p.items()[0], &p.items()[2]));
}

#[test]
fn enqueue_many_appends_and_selects_last() {
    let mut p = playlist_of(&["A"]);
    let added = p.enqueue_many(vec![song("B"), song("C")]);
    assert_eq!(added.len(), 2);
    assert_eq!(titles(p.items()), ["A", "B", "C"]);
    assert_eq!(p.selection(), Some(added[1].id()));
}

#[test]
fn insert_clamps_index() {
    let mut p = playlist_of(&["A", "B"]);
    p.insert(1, vec![song("X"), song("Y")]);
    assert_eq!(titles(p.items()), ["A", "X", "Y", "B"]);
    p.insert(99, vec![song("Z")]);
    assert_eq!(titles(p.items()), ["A", "X", "Y", "B", "Z"]);
}

#[test]
fn reorder_forward_accounts_for_removal_shift() {
    let mut p = playlist_of(&["A", "B", "C"]);
    let a = p.items()[0].id();
    assert!(p.reorder(a, 2));
    assert_eq!(titles(p.items()), ["B", "A", "C"]);
}

#[test]
fn reorder_backward_and_past_end() {
    let mut p = playlist_of(&["A", "B", "C"]);
    let c = p.items()[2].id();
    assert!(p.reorder(c, 0));
    assert_eq!(titles(p.items()), ["C", "A", "B"]);

    let c = p.items()[0].id();
    assert!(p.reorder(c, 10));
    assert_eq!(titles(p.items()), ["A", "B", "C"]);
}

#[test]
fn reorder_unknown_item_is_rejected() {
    let mut p = playlist_of(&["A"]);
    assert!(!p.reorder(crate::model::ItemId(u64::MAX), 0));
    assert_eq!(titles(p.items()), ["A"]);
}

#[test]
fn next_without_current_starts_at_head() {
    let mut p = playlist_of(&["A", "B"]);
    let mut lib = ScriptedLibrary::default();
    let next = p.get_next(query(None), &mut lib).unwrap();
    assert_eq!(next.song().title, "A");
    assert_eq!(p.selection(), Some(next.id()));
    assert_eq!(p.len(), 2);
}

#[test]
fn next_removes_item_under_remove_after_fetch() {
    let mut p = playlist_of(&["A", "B"]);
    let a = p.items()[0].clone();
    let mut lib = ScriptedLibrary::default();

    let next = p
        .get_next(
            NextQuery {
                remove_after_fetch: true,
                ..query(Some(&a))
            },
            &mut lib,
        )
        .unwrap();

    assert_eq!(next.song().title, "B");
    assert_eq!(titles(p.items()), ["A"]);
    assert_eq!(titles(p.history()), ["B"]);
}

#[test]
fn next_at_end_falls_back_to_library() {
    let mut p = playlist_of(&["A", "B"]);
    let b = p.items()[1].clone();
    let mut lib = ScriptedLibrary::new(&["C"]);

    let next = p
        .get_next(
            NextQuery {
                fallback_to_library: true,
                ..query(Some(&b))
            },
            &mut lib,
        )
        .unwrap();

    assert_eq!(next.song().title, "C");
    assert_eq!(titles(p.items()), ["A", "B", "C"]);
}

#[test]
fn random_fallback_uses_random_song() {
    let mut p = Playlist::new();
    let mut lib = ScriptedLibrary::new(&["Seq"]).with_random(&["Rnd"]);
    let next = p
        .get_next(
            NextQuery {
                random: true,
                fallback_to_library: true,
                ..query(None)
            },
            &mut lib,
        )
        .unwrap();
    assert_eq!(next.song().title, "Rnd");
}

#[test]
fn next_at_end_without_fallback_is_none() {
    let mut p = playlist_of(&["A"]);
    let a = p.items()[0].clone();
    let mut lib = ScriptedLibrary::new(&["C"]);
    assert!(p.get_next(query(Some(&a)), &mut lib).is_none());
    assert_eq!(p.len(), 1);
}

#[test]
fn exhausted_library_yields_nothing() {
    let mut p = Playlist::new();
    let mut lib = ScriptedLibrary::default();
    let next = p.get_next(
        NextQuery {
            fallback_to_library: true,
            ..query(None)
        },
        &mut lib,
    );
    assert!(next.is_none());
    assert!(p.is_empty());
}

#[test]
fn previous_walks_back_through_live_playlist() {
    let mut p = playlist_of(&["A", "B", "C"]);
    let a = p.items()[0].clone();
    let c = p.items()[2].clone();

    assert!(p.has_previous(Some(&c)));
    assert_eq!(p.get_previous(Some(&c)).unwrap().song().title, "B");
    assert!(!p.has_previous(Some(&a)));
    assert!(p.get_previous(Some(&a)).is_none());
    assert!(p.get_previous(None).is_none());
}

#[test]
fn clear_empties_playlist_but_keeps_history() {
    let mut p = playlist_of(&["A", "B"]);
    let b = p.items()[1].clone();
    p.consume(b.id());
    p.clear();

    assert!(p.is_empty());
    assert_eq!(p.history().len(), 1);
    let mut lib = ScriptedLibrary::new(&["X"]);
    assert!(p.get_next(query(None), &mut lib).is_none());
    assert!(p.get_previous(Some(&b)).is_none());
}

#[test]
fn remove_drops_selection_of_removed_item() {
    let mut p = Playlist::new();
    let added = p.enqueue_many(vec![song("A"), song("B")]);
    let removed = p.remove(added[1].id()).unwrap();
    assert!(same_item(&removed, &added[1]));
    assert_eq!(p.selection(), None);
    assert!(p.remove(added[1].id()).is_none());
}
