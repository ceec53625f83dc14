use std::collections::BTreeSet;

use itertools::Itertools;

use crate::config::ChrootFilter;

impl ChrootFilter {
    /// Check whether `chroot` belongs to the configured platform and architecture.
    pub fn matches(&self, chroot: &str) -> bool {
        chroot.starts_with(&self.platform_prefix)
            && chroot
                .strip_suffix(&self.architecture)
                .map_or(false, |rest| rest.ends_with('-'))
    }
}

/// Pick the default chroots out of a raw catalog listing.
///
/// Each catalog line is expected to start with a chroot identifier,
/// anything after the first whitespace is ignored. The result is sorted.
pub(crate) fn default_chroots(catalog: &str, filter: &ChrootFilter) -> Vec<String> {
    catalog
        .lines()
        .filter_map(|line| line.split_whitespace().next())
        .filter(|chroot| filter.matches(chroot))
        .map(String::from)
        .sorted()
        .collect()
}

/// Append user-provided chroots, separated by whitespace, to the defaults.
///
/// Duplicates are kept.
pub(crate) fn with_extras<S: AsRef<str>>(defaults: Vec<String>, extras: &[S]) -> Vec<String> {
    let mut chroots = defaults;

    chroots.extend(
        extras
            .iter()
            .flat_map(|extra| extra.as_ref().split_whitespace())
            .map(String::from),
    );

    chroots
}

/// Set union of the existing and selected chroots, sorted.
pub(crate) fn union(existing: &[String], selected: &[String]) -> Vec<String> {
    existing
        .iter()
        .chain(selected)
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
