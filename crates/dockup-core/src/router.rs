/// Flat view of the command-line flags, immutable for one invocation.
#[derive(Debug, Clone, Default)]
pub struct WorkflowArgs {
    pub save: bool,
    pub pull: bool,
    pub restore: bool,
    pub run: bool,
    pub list_backups: bool,
    pub tar: bool,
    pub aws: bool,
    pub date: Option<String>,
    pub download_backup: Option<String>,
    pub download_all: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Workflow {
    /// Enumerate and print the remote catalog.
    List,
    /// Print (and optionally download) the backups from one day.
    ByDate { date: String, download_all: bool },
    /// Download exactly one named object.
    Download { key: String },
    /// Export the container locally and/or to the bucket.
    Save { tar: bool, aws: bool },
    /// Fetch the latest backup, optionally import and run it.
    Pull { restore: bool, run: bool },
    /// Run a fresh detached container, refusing to clobber an existing one.
    Run,
    /// Default: back up and replace the container if present, then run it.
    Cycle,
}

/// Ordered decision cascade, first match wins. The order is a contract:
/// `list_backups` beats `date` beats `download_backup` beats `save` beats
/// `pull` beats `run`; anything else is the default cycle.
pub fn select_workflow(args: &WorkflowArgs) -> Workflow {
    if args.list_backups {
        return Workflow::List;
    }
    if let Some(date) = &args.date {
        return Workflow::ByDate {
            date: date.clone(),
            download_all: args.download_all,
        };
    }
    if let Some(key) = &args.download_backup {
        return Workflow::Download { key: key.clone() };
    }
    if args.save {
        return Workflow::Save {
            tar: args.tar,
            aws: args.aws,
        };
    }
    if args.pull {
        return Workflow::Pull {
            restore: args.restore,
            run: args.run,
        };
    }
    if args.run {
        return Workflow::Run;
    }
    Workflow::Cycle
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_flags_select_the_default_cycle() {
        assert_eq!(select_workflow(&WorkflowArgs::default()), Workflow::Cycle);
    }

    #[test]
    fn list_backups_wins_over_save() {
        let args = WorkflowArgs {
            list_backups: true,
            save: true,
            tar: true,
            ..Default::default()
        };
        assert_eq!(select_workflow(&args), Workflow::List);
    }

    #[test]
    fn date_wins_over_download_and_save() {
        let args = WorkflowArgs {
            date: Some("20240101".to_string()),
            download_backup: Some("a.backup.tar.gz".to_string()),
            save: true,
            download_all: true,
            ..Default::default()
        };
        assert_eq!(
            select_workflow(&args),
            Workflow::ByDate {
                date: "20240101".to_string(),
                download_all: true,
            }
        );
    }

    #[test]
    fn download_backup_wins_over_save_and_pull() {
        let args = WorkflowArgs {
            download_backup: Some("a.backup.tar.gz".to_string()),
            save: true,
            pull: true,
            ..Default::default()
        };
        assert_eq!(
            select_workflow(&args),
            Workflow::Download {
                key: "a.backup.tar.gz".to_string(),
            }
        );
    }

    #[test]
    fn save_wins_over_pull_and_run() {
        let args = WorkflowArgs {
            save: true,
            pull: true,
            run: true,
            aws: true,
            ..Default::default()
        };
        assert_eq!(select_workflow(&args), Workflow::Save { tar: false, aws: true });
    }

    #[test]
    fn pull_captures_restore_and_run() {
        let args = WorkflowArgs {
            pull: true,
            restore: true,
            run: true,
            ..Default::default()
        };
        assert_eq!(
            select_workflow(&args),
            Workflow::Pull {
                restore: true,
                run: true,
            }
        );

        let args = WorkflowArgs {
            pull: true,
            ..Default::default()
        };
        assert_eq!(
            select_workflow(&args),
            Workflow::Pull {
                restore: false,
                run: false,
            }
        );
    }

    #[test]
    fn bare_run_selects_run() {
        let args = WorkflowArgs {
            run: true,
            ..Default::default()
        };
        assert_eq!(select_workflow(&args), Workflow::Run);
    }

    #[test]
    fn restore_alone_falls_through_to_the_default() {
        // `restore` only modifies `pull`; on its own it routes nowhere else.
        let args = WorkflowArgs {
            restore: true,
            ..Default::default()
        };
        assert_eq!(select_workflow(&args), Workflow::Cycle);
    }
}
