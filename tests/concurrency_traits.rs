use handover::{CoupledList, NodeMutex, PushError};
use std::cell::Cell;
use std::rc::Rc;

fn assert_send<T: Send>() {}
fn assert_sync<T: Sync>() {}

#[test]
fn coupled_list_is_send_and_sync_for_send_values() {
    assert_send::<CoupledList<u64>>();
    assert_sync::<CoupledList<u64>>();
    // `Cell` is `Send` but not `Sync`; the node locks make sharing sound anyway.
    assert_send::<CoupledList<Cell<u64>>>();
    assert_sync::<CoupledList<Cell<u64>>>();
}

#[test]
fn node_mutex_send_sync_follows_t_bounds() {
    assert_send::<NodeMutex<Vec<u8>>>();
    assert_sync::<NodeMutex<Vec<u8>>>();
}

#[test]
fn push_error_is_a_std_error() {
    fn assert_error<E: std::error::Error + Send + Sync + 'static>() {}
    assert_error::<PushError<String>>();
}

#[test]
fn rc_values_stay_on_one_thread() {
    // `Rc` is neither `Send` nor `Sync`, so the list is only usable locally.
    let list = CoupledList::new();
    list.push_front(Rc::new(5));
    assert_eq!(list.find_first_of(|v| **v == 5).map(|v| *v), Some(5));
}
