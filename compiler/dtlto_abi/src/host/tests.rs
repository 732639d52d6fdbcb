use std::sync::Mutex;

use super::*;
use pretty_assertions::assert_eq;

#[derive(Default)]
struct Collect(Mutex<Vec<String>>);

impl DiagnosticSink for Collect {
    fn emit_error(&self, message: &str) {
        self.0.lock().unwrap().push(format!("error: {message}"));
    }

    fn emit_warn(&self, message: &str) {
        self.0.lock().unwrap().push(format!("warning: {message}"));
    }
}

#[test]
fn view_routes_into_sink() {
    let sink = Collect::default();
    let host = HostConfig::new("local::test", &sink).unwrap();
    let view = host.view();

    assert_eq!(view.name(), "local::test");
    assert_eq!(view.abi_version(), DTLTO_ABI_VERSION);
    view.emit_error("boom");
    view.emit_warn("careful");

    assert_eq!(
        *sink.0.lock().unwrap(),
        vec!["error: boom".to_string(), "warning: careful".to_string()]
    );
}

#[test]
fn raw_block_survives_moves() {
    let sink = Collect::default();
    let host = HostConfig::new("local", &sink).unwrap();
    let moved = vec![host];
    let raw = moved[0].raw();
    let message = CString::new("from plugin").unwrap();
    unsafe { (raw.emit_error)(raw.diag_context, message.as_ptr()) };

    assert_eq!(*sink.0.lock().unwrap(), vec!["error: from plugin".to_string()]);
}

#[test]
fn null_message_is_ignored() {
    let sink = Collect::default();
    let host = HostConfig::new("local", &sink).unwrap();
    let raw = host.raw();
    unsafe { (raw.emit_warn)(raw.diag_context, std::ptr::null()) };
    assert!(sink.0.lock().unwrap().is_empty());
}

#[test]
fn name_with_nul_is_rejected() {
    let sink = Collect::default();
    let err = HostConfig::new("lo\0cal", &sink).err().unwrap();
    assert_eq!(err.field, "dbs_name");
}

struct Panics;

impl DiagnosticSink for Panics {
    fn emit_error(&self, message: &str) {
        panic!("sink rejected {message}");
    }

    fn emit_warn(&self, _: &str) {}
}

#[test]
fn panicking_sink_does_not_unwind_through_callback() {
    let sink = Panics;
    let host = HostConfig::new("local", &sink).unwrap();
    let raw = host.raw();
    let message = CString::new("boom").unwrap();
    // Returning at all means the panic stayed on the host side.
    unsafe { (raw.emit_error)(raw.diag_context, message.as_ptr()) };
    host.view().emit_error("again");
}
