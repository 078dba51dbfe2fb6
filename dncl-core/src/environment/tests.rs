use pretty_assertions::assert_eq;

use super::prelude::{DnclObject, Environment};
use crate::utils::prelude::SrcSpan;

fn int(value: i64) -> DnclObject {
    DnclObject::int(value, SrcSpan::default())
}

#[test]
fn test_lookup_walks_outward() {
    let global = Environment::new_shared();
    global.borrow_mut().define("x".to_string(), int(1));

    let inner = Environment::enclosed(global.clone());
    let innermost = Environment::enclosed(inner.clone());

    assert_eq!(innermost.borrow().get("x"), Some(int(1)));
    assert!(innermost.borrow().is_defined("x"));
    assert_eq!(innermost.borrow().get("y"), None);
}

#[test]
fn test_assign_mutates_defining_scope() {
    let global = Environment::new_shared();
    global.borrow_mut().define("x".to_string(), int(1));

    let inner = Environment::enclosed(global.clone());
    inner.borrow_mut().assign("x".to_string(), int(2));

    assert_eq!(global.borrow().get("x"), Some(int(2)));
    assert!(inner.borrow().store.is_empty());
}

#[test]
fn test_assign_defines_new_names_locally() {
    let global = Environment::new_shared();
    let inner = Environment::enclosed(global.clone());

    inner.borrow_mut().assign("y".to_string(), int(3));

    assert_eq!(inner.borrow().get("y"), Some(int(3)));
    assert!(!global.borrow().is_defined("y"));
}

#[test]
fn test_define_shadows() {
    let global = Environment::new_shared();
    global.borrow_mut().define("x".to_string(), int(1));

    let inner = Environment::enclosed(global.clone());
    inner.borrow_mut().define("x".to_string(), int(5));

    assert_eq!(inner.borrow().get("x"), Some(int(5)));
    assert_eq!(global.borrow().get("x"), Some(int(1)));
}

#[test]
fn test_values_compare_without_locations() {
    let a = DnclObject::int(7, SrcSpan::from(0, 1));
    let b = DnclObject::int(7, SrcSpan::from(10, 11));

    assert_eq!(a, b);
    assert_ne!(a, DnclObject::string("7", SrcSpan::default()));
    assert_eq!(DnclObject::null(SrcSpan::default()), DnclObject::null(SrcSpan::from(3, 4)));
}

#[test]
fn test_arrays_are_shared() {
    let array = DnclObject::array(vec![int(1), int(2)], SrcSpan::default());
    let alias = array.clone();

    if let DnclObject::Array { elements, .. } = &alias {
        elements.borrow_mut()[0] = int(9);
    }

    assert_eq!(array.to_string(), "[9, 2]");
    assert_eq!(array, DnclObject::array(vec![int(9), int(2)], SrcSpan::default()));
}

#[test]
fn test_signals() {
    let error = DnclObject::error("boom", SrcSpan::from(2, 4));
    let ret = DnclObject::return_value(int(1), SrcSpan::default());

    assert!(error.is_error() && error.is_signal());
    assert!(!ret.is_error() && ret.is_signal());
    assert!(!int(1).is_signal());
    assert_eq!(ret.unwrap_return(), int(1));
    assert_eq!(error.location(), SrcSpan::from(2, 4));
    assert_eq!(error.to_string(), "Error: boom");
}
