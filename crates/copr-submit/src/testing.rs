use std::{
    cell::RefCell,
    collections::{BTreeMap, VecDeque},
    io,
};

use crate::{
    copr::{CoprError, ProjectProbe},
    process::{CommandOutput, Invocation, ProcessError, Runner},
    prompt::Prompter,
};

/// [`Runner`] that records invocations and answers them with a closure.
pub(crate) struct FakeRunner<'a> {
    /// Recorded invocations, in call order.
    calls: RefCell<Vec<Invocation>>,

    /// Response factory.
    handler: Box<dyn Fn(&Invocation) -> CommandOutput + 'a>,
}

impl<'a> FakeRunner<'a> {
    /// Create a runner answering every invocation with `handler`.
    pub fn new(handler: impl Fn(&Invocation) -> CommandOutput + 'a) -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            handler: Box::new(handler),
        }
    }

    /// All recorded invocations.
    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.borrow().clone()
    }

    /// Recorded invocations of `program`.
    pub fn calls_to(&self, program: &str) -> Vec<Invocation> {
        self.calls
            .borrow()
            .iter()
            .filter(|invocation| invocation.program == program)
            .cloned()
            .collect()
    }
}

impl Runner for FakeRunner<'_> {
    fn run(&self, invocation: &Invocation) -> Result<CommandOutput, ProcessError> {
        self.calls.borrow_mut().push(invocation.clone());
        Ok((self.handler)(invocation))
    }
}

/// In-memory Copr service answering `copr-cli` invocations and page probes.
pub(crate) struct FakeCopr {
    /// Authenticated user, [`None`] when `whoami` should fail.
    pub user: Option<String>,

    /// Chroot catalog lines, [`None`] when `list-chroots` should fail.
    pub catalog: Option<Vec<String>>,

    /// Projects with their chroot sets, keyed by `owner/name`.
    pub projects: RefCell<BTreeMap<String, Vec<String>>>,

    /// Arguments of submitted builds.
    pub builds: RefCell<Vec<Vec<String>>>,
}

impl FakeCopr {
    /// Create a service with the authenticated `user` and the chroot `catalog`.
    pub fn new(user: &str, catalog: &[&str]) -> Self {
        Self {
            user: Some(user.to_owned()),
            catalog: Some(catalog.iter().map(|chroot| chroot.to_string()).collect()),
            projects: RefCell::new(BTreeMap::new()),
            builds: RefCell::new(Vec::new()),
        }
    }

    /// Add an existing project.
    pub fn with_project(self, project: &str, chroots: &[&str]) -> Self {
        self.projects.borrow_mut().insert(
            project.to_owned(),
            chroots.iter().map(|chroot| chroot.to_string()).collect(),
        );
        self
    }

    /// Current chroot set of `project`.
    pub fn chroots_of(&self, project: &str) -> Option<Vec<String>> {
        self.projects.borrow().get(project).cloned()
    }

    /// Answer a single Copr client invocation.
    pub fn handle(&self, invocation: &Invocation) -> CommandOutput {
        let args = copr_args(invocation);

        match args.first().map(String::as_str) {
            Some("whoami") => match &self.user {
                Some(user) => CommandOutput::success(format!("{user}\n")),
                None => CommandOutput::failure(1),
            },
            Some("list-chroots") => match &self.catalog {
                Some(catalog) => CommandOutput::success(catalog.join("\n")),
                None => CommandOutput::failure(1),
            },
            Some("get-chroots") => match self.projects.borrow().get(&args[1]) {
                Some(chroots) => CommandOutput::success(chroots.join(" ")),
                None => CommandOutput::failure(1),
            },
            Some("create") => {
                let mut projects = self.projects.borrow_mut();

                if projects.contains_key(&args[1]) {
                    return CommandOutput::failure(1);
                }

                projects.insert(args[1].clone(), chroot_flags(&args[2..]));
                CommandOutput::success("")
            }
            Some("modify") => match self.projects.borrow_mut().get_mut(&args[1]) {
                Some(chroots) => {
                    *chroots = chroot_flags(&args[2..]);
                    CommandOutput::success("")
                }
                None => CommandOutput::failure(1),
            },
            Some("build") => {
                self.builds.borrow_mut().push(args[1..].to_vec());
                CommandOutput::success("Build was added to tools.\n")
            }
            _ => CommandOutput::failure(127),
        }
    }
}

/// Copr client arguments following the `--config <path>` prefix.
pub(crate) fn copr_args(invocation: &Invocation) -> &[String] {
    match invocation.args.as_slice() {
        [flag, _, rest @ ..] if flag == "--config" => rest,
        args => args,
    }
}

/// Copr client subcommand of `invocation`.
pub(crate) fn copr_subcommand(invocation: &Invocation) -> Option<&str> {
    copr_args(invocation).first().map(String::as_str)
}

/// Collect values of `--chroot <value>` pairs.
fn chroot_flags(args: &[String]) -> Vec<String> {
    args.chunks(2)
        .filter(|pair| pair.len() == 2 && pair[0] == "--chroot")
        .map(|pair| pair[1].clone())
        .collect()
}

impl ProjectProbe for FakeCopr {
    fn exists(&self, url: &str) -> Result<bool, CoprError> {
        let project = url
            .split_once("/coprs/")
            .map(|(_, project)| project.trim_end_matches('/'))
            .unwrap_or_default();

        Ok(self.projects.borrow().contains_key(project))
    }
}

/// [`Prompter`] replaying prepared answers in order.
pub(crate) struct ScriptedPrompter {
    /// Remaining answers.
    answers: RefCell<VecDeque<String>>,

    /// Questions asked so far.
    questions: RefCell<Vec<String>>,
}

impl ScriptedPrompter {
    /// Create a prompter replaying `answers`.
    pub fn new(answers: &[&str]) -> Self {
        Self {
            answers: RefCell::new(answers.iter().map(|answer| answer.to_string()).collect()),
            questions: RefCell::new(Vec::new()),
        }
    }

    /// Questions asked so far.
    pub fn questions(&self) -> Vec<String> {
        self.questions.borrow().clone()
    }

    /// Record `question` and pop the next answer.
    fn next(&self, question: &str) -> io::Result<String> {
        self.questions.borrow_mut().push(question.to_owned());
        self.answers
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "no scripted answer"))
    }
}

impl Prompter for ScriptedPrompter {
    fn ask(&self, question: &str, default: Option<&str>) -> io::Result<String> {
        let answer = self.next(question)?;

        match default {
            Some(default) if answer.is_empty() => Ok(default.to_owned()),
            _ => Ok(answer),
        }
    }

    fn ask_secret(&self, question: &str) -> io::Result<String> {
        self.next(question)
    }
}
