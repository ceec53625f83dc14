use tracing::info;

use crate::{
    chroots,
    copr::{project_url, Copr, CoprError, ProjectProbe, ProjectRef},
};

/// Outcome of the project provisioning.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Provisioned {
    /// Project did not exist and was created with the selected chroots.
    Created(Vec<String>),

    /// Project existed and its chroot set was widened to the contained one.
    Updated(Vec<String>),
}

/// Make sure project `name` of the current user exists with all `selected` chroots enabled.
///
/// Existing chroots of an already present project are kept.
pub(crate) fn provision(
    copr: &Copr,
    probe: &dyn ProjectProbe,
    copr_url: &str,
    name: &str,
    selected: &[String],
) -> Result<(ProjectRef, Provisioned), CoprError> {
    let project = ProjectRef {
        owner: copr.whoami()?,
        name: name.to_owned(),
    };

    if probe.exists(&project_url(copr_url, &project))? {
        println!("Copr repository '{name}' exists, updating its chroots...");

        let existing = copr.project_chroots(&project);
        let chroots = chroots::union(&existing, selected);

        info!(%project, ?chroots, "modifying project chroots");
        copr.modify(&project, &chroots)?;

        Ok((project, Provisioned::Updated(chroots)))
    } else {
        println!("Copr repository '{name}' does not exist, creating it...");

        info!(%project, chroots = ?selected, "creating project");
        copr.create(&project, selected)?;

        Ok((project, Provisioned::Created(selected.to_vec())))
    }
}
