use core::cell::Cell;
use std::io::{self, Error};

use io_trait::Io;
use log::{info, warn};

use crate::mem::{
    arena::Arena,
    error::HandleError,
    local::Local,
    manager::Manager,
};

type ScenarioResult = Result<(), String>;

fn ensure(condition: bool, message: &str) -> ScenarioResult {
    if condition {
        Ok(())
    } else {
        Err(message.to_string())
    }
}

struct Tracked<'a>(&'a Cell<u32>);

impl Drop for Tracked<'_> {
    fn drop(&mut self) {
        self.0.set(self.0.get() + 1);
    }
}

fn free_invalidates(local: &Local) -> ScenarioResult {
    let mut h = local.handle_new(5).map_err(|e| e.to_string())?;
    let r = h.ref_();
    ensure(r.is_valid(), "reference is invalid while its handle lives")?;
    ensure(r.get().map(|v| *v) == Some(5), "reference does not read the object")?;
    h.free();
    ensure(!r.is_valid(), "reference is valid after free")?;
    ensure(r.as_ptr().is_null(), "reference points to a freed object")
}

fn assign_invalidates(local: &Local) -> ScenarioResult {
    let drops_a = Cell::new(0);
    let drops_b = Cell::new(0);
    let mut h1 = local
        .handle_new(Tracked(&drops_a))
        .map_err(|e| e.to_string())?;
    let r = h1.ref_();
    let h2 = local
        .handle_new(Tracked(&drops_b))
        .map_err(|e| e.to_string())?;
    h1 = h2;
    ensure(drops_a.get() == 1, "overwritten object was not dropped once")?;
    ensure(!r.is_valid(), "reference is valid after its owner was overwritten")?;
    ensure(
        h1.get().is_some_and(|t| core::ptr::eq(t.0, &drops_b)),
        "handle does not own the assigned object",
    )?;
    drop(h1);
    ensure(drops_b.get() == 1, "assigned object was not dropped once")
}

fn many_references(local: &Local) -> ScenarioResult {
    let h = local.handle_new(0u64).map_err(|e| e.to_string())?;
    let mut refs: Vec<_> = (0..1000).map(|_| h.ref_()).collect();
    ensure(h.ref_count() == 1000, "reference count is not 1000")?;
    let mut i = 0;
    while !refs.is_empty() {
        i = (i + 389) % refs.len();
        drop(refs.swap_remove(i));
    }
    ensure(h.ref_count() == 0, "reference count did not return to 0")?;
    let before = local.block_count();
    drop(h);
    ensure(
        local.block_count() + 1 == before,
        "block was not released exactly once",
    )
}

fn references_outlive_handle(local: &Local) -> ScenarioResult {
    let h = local.handle_new([0u8; 64]).map_err(|e| e.to_string())?;
    let refs: Vec<_> = (0..10).map(|_| h.ref_()).collect();
    let before = local.block_count();
    drop(h);
    ensure(
        local.block_count() == before,
        "block was released while references exist",
    )?;
    ensure(
        refs.iter().all(|r| !r.is_valid() && r.get().is_none()),
        "reference is valid after its owner was dropped",
    )?;
    drop(refs);
    ensure(
        local.block_count() + 1 == before,
        "block was not released by the last reference",
    )
}

fn out_of_memory() -> ScenarioResult {
    let mut range = [0u8; 4];
    let arena = Arena::new(&mut range);
    // bound so the handle is dropped before `arena`
    let result = match arena.handle_new(0u64) {
        Err(HandleError::OutOfMemory { .. }) => Ok(()),
        Err(e) => Err(format!("unexpected error: {e}")),
        Ok(_) => Err("allocation succeeded in an exhausted arena".to_string()),
    };
    result
}

/// Runs the lifecycle scenarios and writes a report to the file named by the
/// first argument.
pub fn run(io: &impl Io) -> io::Result<()> {
    let mut a = io.args();
    a.next();
    let output = a
        .next()
        .ok_or_else(|| Error::other("usage: handleref <report-file>"))?;

    let local = Local::default();
    let results = [
        ("free_invalidates", free_invalidates(&local)),
        ("assign_invalidates", assign_invalidates(&local)),
        ("many_references", many_references(&local)),
        ("references_outlive_handle", references_outlive_handle(&local)),
        ("out_of_memory", out_of_memory()),
    ];

    let mut report = String::new();
    let mut failed = 0;
    for (name, result) in results {
        match result {
            Ok(()) => report += &format!("{name}: ok\n"),
            Err(e) => {
                warn!("{name} failed: {e}");
                failed += 1;
                report += &format!("{name}: failed: {e}\n");
            }
        }
    }
    let leaked = local.block_count();
    report += &format!("leaked blocks: {leaked}\n");
    io.write(&output, report.as_bytes())?;
    info!("report written to {output}");

    if failed > 0 || leaked > 0 {
        return Err(Error::other(format!(
            "{failed} scenarios failed, {leaked} blocks leaked"
        )));
    }
    Ok(())
}
