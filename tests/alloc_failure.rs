use handover::{AllocError, CoupledList};
use std::alloc::{GlobalAlloc, Layout, System};
use std::cell::Cell;
use std::ptr;

/// Forwards to `System` unless the calling thread has switched allocation off.
struct Exhaustible;

thread_local! {
    static EXHAUSTED: Cell<bool> = const { Cell::new(false) };
}

unsafe impl GlobalAlloc for Exhaustible {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        if EXHAUSTED.try_with(Cell::get).unwrap_or(false) {
            return ptr::null_mut();
        }
        System.alloc(layout)
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        System.dealloc(ptr, layout);
    }
}

#[global_allocator]
static GLOBAL: Exhaustible = Exhaustible;

/// Runs `f` with every allocation on this thread failing.
fn exhausted<R>(f: impl FnOnce() -> R) -> R {
    EXHAUSTED.with(|flag| flag.set(true));
    let result = f();
    EXHAUSTED.with(|flag| flag.set(false));
    result
}

fn collect(list: &CoupledList<String>) -> Vec<String> {
    let mut out = Vec::new();
    list.for_each(|v| out.push(v.clone()));
    out
}

#[test]
fn test_try_push_front_reports_exhaustion() {
    let list = CoupledList::new();
    list.push_front(String::from("b"));
    list.push_front(String::from("a"));

    let rejected = String::from("lost?");
    let result = exhausted(|| list.try_push_front(rejected));

    let err = result.unwrap_err();
    assert_eq!(err.cause(), AllocError);
    assert_eq!(err.into_inner(), "lost?");
    assert_eq!(collect(&list), vec!["a", "b"]);
}

#[test]
fn test_list_usable_after_exhaustion() {
    let list = CoupledList::new();
    assert!(exhausted(|| list.try_push_front(String::from("x"))).is_err());
    assert!(list.is_empty());

    list.try_push_front(String::from("y")).unwrap();
    assert_eq!(collect(&list), vec!["y"]);
    assert_eq!(list.remove_if(|v| v == "y"), 1);
    assert!(list.is_empty());
}
