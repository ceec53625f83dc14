use crate::{chroots::default_chroots, commands::Session};

/// Default chroot set, or an empty list if the catalog cannot be retrieved.
pub(crate) fn discover(session: &Session) -> Vec<String> {
    session
        .copr()
        .list_chroots()
        .map(|catalog| default_chroots(&catalog, &session.config.chroots))
        .unwrap_or_default()
}

/// Print the default chroots, one per line.
pub(crate) fn chroots(session: &Session) {
    for chroot in discover(session) {
        println!("{chroot}");
    }
}
