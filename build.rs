//! Build metadata for the startup event, resolved without external tools.
//!
//! Image builds are expected to be reproducible: the timestamp comes from
//! `SOURCE_DATE_EPOCH` rather than the wall clock, and the commit is read from
//! `.git` directly since slim build stages usually carry no `git` binary.
//! Either value may be pinned with `ENTRYPOINT_BUILD_GIT_HASH` /
//! `ENTRYPOINT_BUILD_TIMESTAMP`; otherwise it falls back to `unknown`.

use std::env;
use std::fs;

const UNKNOWN: &str = "unknown";
const SHORT_HASH_LEN: usize = 12;

fn main() {
    println!("cargo:rerun-if-env-changed=ENTRYPOINT_BUILD_GIT_HASH");
    println!("cargo:rerun-if-env-changed=ENTRYPOINT_BUILD_TIMESTAMP");
    println!("cargo:rerun-if-env-changed=SOURCE_DATE_EPOCH");

    let git_hash = pinned("ENTRYPOINT_BUILD_GIT_HASH")
        .or_else(head_commit)
        .unwrap_or_else(|| UNKNOWN.to_string());
    let timestamp = pinned("ENTRYPOINT_BUILD_TIMESTAMP")
        .or_else(source_date_epoch)
        .unwrap_or_else(|| UNKNOWN.to_string());

    println!("cargo:rustc-env=ENTRYPOINT_BUILD_GIT_HASH={git_hash}");
    println!("cargo:rustc-env=ENTRYPOINT_BUILD_TIMESTAMP={timestamp}");
}

fn pinned(name: &str) -> Option<String> {
    let value = env::var(name).ok()?;
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Resolve `.git/HEAD` to a short commit id, following one symbolic ref
/// through the loose ref file or `packed-refs`.
fn head_commit() -> Option<String> {
    println!("cargo:rerun-if-changed=.git/HEAD");
    let head = fs::read_to_string(".git/HEAD").ok()?;
    let head = head.trim();
    let full = match head.strip_prefix("ref: ") {
        Some(reference) => {
            println!("cargo:rerun-if-changed=.git/{reference}");
            println!("cargo:rerun-if-changed=.git/packed-refs");
            loose_ref(reference).or_else(|| packed_ref(reference))?
        }
        None => head.to_string(),
    };
    is_commit_id(&full).then(|| full[..SHORT_HASH_LEN].to_string())
}

fn loose_ref(reference: &str) -> Option<String> {
    let id = fs::read_to_string(format!(".git/{reference}")).ok()?;
    Some(id.trim().to_string())
}

fn packed_ref(reference: &str) -> Option<String> {
    let packed = fs::read_to_string(".git/packed-refs").ok()?;
    packed
        .lines()
        .filter(|line| !line.starts_with('#') && !line.starts_with('^'))
        .find_map(|line| {
            let (id, name) = line.split_once(' ')?;
            (name.trim() == reference).then(|| id.to_string())
        })
}

fn is_commit_id(id: &str) -> bool {
    id.len() >= SHORT_HASH_LEN && id.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Format `SOURCE_DATE_EPOCH` as `YYYY-MM-DDTHH:MM:SSZ`.
fn source_date_epoch() -> Option<String> {
    let secs: i64 = env::var("SOURCE_DATE_EPOCH").ok()?.trim().parse().ok()?;
    if secs < 0 {
        return None;
    }
    let (days, rem) = (secs / 86_400, secs % 86_400);
    let (year, month, day) = civil_from_days(days);
    Some(format!(
        "{year:04}-{month:02}-{day:02}T{:02}:{:02}:{:02}Z",
        rem / 3600,
        rem % 3600 / 60,
        rem % 60
    ))
}

/// Proleptic Gregorian date for a count of days since 1970-01-01
/// (Howard Hinnant's `civil_from_days`).
fn civil_from_days(days: i64) -> (i64, i64, i64) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = doy - (153 * mp + 2) / 5 + 1;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = yoe + era * 400 + i64::from(month <= 2);
    (year, month, day)
}
