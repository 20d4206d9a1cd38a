//! POSIX process-group signalling for pane processes.

use std::fs::{self, OpenOptions};
use std::io;
use std::os::unix::fs::OpenOptionsExt;
use std::path::Path;

use nix::fcntl::OFlag;
use nix::sys::signal::{killpg, Signal};
use nix::unistd::{getpgid, tcgetpgrp, Pid};

/// Signal the process group that `pid` belongs to.
pub(super) fn signal_group_of(pid: i32, signal: Signal) -> nix::Result<Pid> {
    let pgid = getpgid(Some(Pid::from_raw(pid)))?;
    killpg(pgid, signal)?;
    Ok(pgid)
}

/// Ask the terminal driver which process group owns the foreground of `tty`.
///
/// The device is opened with `O_NOCTTY` so it never becomes our controlling
/// terminal, and `O_NONBLOCK` so a wedged tty cannot stall the caller.
pub(super) fn foreground_group(tty: &Path) -> io::Result<Option<Pid>> {
    let device = OpenOptions::new()
        .read(true)
        .write(true)
        .custom_flags((OFlag::O_NOCTTY | OFlag::O_NONBLOCK).bits())
        .open(tty)?;
    let pgid = tcgetpgrp(&device)?;
    Ok((pgid.as_raw() > 0).then_some(pgid))
}

/// Foreground process group of the terminal `pid` runs on, from the
/// `tpgid` field of `/proc/<pid>/stat`.
///
/// Linux refuses `tcgetpgrp` on a tty that is not the caller's controlling
/// terminal, so this is the route that works there.
pub(super) fn foreground_group_from_proc(pid: i32) -> io::Result<Option<Pid>> {
    let stat = fs::read_to_string(format!("/proc/{pid}/stat"))?;
    Ok(parse_tpgid(&stat)
        .filter(|pgid| *pgid > 0)
        .map(Pid::from_raw))
}

/// `comm` may contain spaces and parentheses, so fields are counted from
/// the last `)`: state, ppid, pgrp, session, tty_nr, tpgid.
fn parse_tpgid(stat: &str) -> Option<i32> {
    let rest = &stat[stat.rfind(')')? + 1..];
    rest.split_whitespace().nth(5)?.parse().ok()
}

pub(super) fn signal_group(pgid: Pid, signal: Signal) -> nix::Result<()> {
    killpg(pgid, signal)
}
