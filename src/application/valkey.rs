//! The `valkey-demo` command tree and its execute entrypoint.

use tracing::{debug, instrument};

use crate::application::error::ApplicationResult;
use crate::application::payload::{Action, GlobalOptions};
use crate::domain::{dispatch, Command, CommandTree, Context, DefinitionError, FlagHandle, Outcome};

pub const PROGRAM_NAME: &str = "valkey-demo";

/// Handles to the root flags, resolved by every action.
#[derive(Debug, Clone, Copy)]
struct GlobalHandles {
    region: FlagHandle<String>,
    profile: FlagHandle<String>,
    dry_run: FlagHandle<bool>,
}

impl GlobalHandles {
    fn resolve(&self, ctx: &Context<'_, Action>) -> GlobalOptions {
        GlobalOptions {
            region: ctx.root(self.region),
            profile: ctx.root(self.profile),
            dry_run: ctx.root(self.dry_run),
        }
    }
}

/// Build a fresh command tree: root flags plus `up`, `down` and `list`.
pub fn build_tree() -> Result<CommandTree<Action>, DefinitionError> {
    let mut root = Command::new(PROGRAM_NAME).about("Describe Valkey demo host actions");
    let flags = root.flags_mut();
    let globals = GlobalHandles {
        region: flags.declare("region", String::new(), "AWS region")?,
        profile: flags.declare("profile", String::new(), "AWS profile")?,
        dry_run: flags.declare("dry-run", false, "describe the action without side effects")?,
    };

    let mut up = Command::new("up").about("Launch an EC2 demo host");
    let flags = up.flags_mut();
    let instance_type = flags.declare("instance-type", String::new(), "EC2 instance type")?;
    let spot = flags.declare("spot", false, "request a spot instance")?;
    let ssm = flags.declare("ssm", false, "enable SSM session access")?;
    let run_id = flags.declare("run-id", String::new(), "identifier of the demo run")?;
    let up = up.handler(move |ctx| Action::Up {
        globals: globals.resolve(ctx),
        instance_type: ctx.local(instance_type),
        spot: ctx.local(spot),
        ssm: ctx.local(ssm),
        run_id: ctx.local(run_id),
    });

    let down = Command::new("down")
        .about("Terminate a demo host")
        .handler(move |ctx| Action::Down {
            globals: globals.resolve(ctx),
        });

    let list = Command::new("list")
        .about("Show active runs")
        .handler(move |ctx| Action::List {
            globals: globals.resolve(ctx),
        });

    let mut tree = CommandTree::new(root);
    let root = tree.root();
    tree.add_children(root, [up, down, list])?;
    Ok(tree)
}

/// Parse `args` (program name excluded) into an action or a help request.
///
/// Each call builds its own tree, so concurrent callers share nothing.
#[instrument(level = "debug")]
pub fn execute(args: &[String]) -> ApplicationResult<Outcome<Action>> {
    let mut tree = build_tree()?;
    let outcome = dispatch(&mut tree, args)?;
    if let Outcome::Completed(action) = &outcome {
        debug!(action = action.name(), "resolved");
    }
    Ok(outcome)
}
