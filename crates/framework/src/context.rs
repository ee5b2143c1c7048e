use crate::db::{DbConnection, DbTableConfigs};
use crate::{Error, Result};

use clap::{ArgMatches, Command};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::ffi::OsString;
use std::path::PathBuf;

/// Binary name used when handing command lines to `clap`.
const BIN_NAME: &str = "desk";

/// The application context shared by the command line and the
/// terminal UI.
///
/// ```
/// # use framework::prelude::*;
/// # use clap::{Command, ArgMatches};
/// #[derive(Clone)]
/// struct GreetPlugin;
///
/// impl Plugin for GreetPlugin {
///     fn build(self, context: &mut Context) -> Result<()> {
///         context.add_command(Command::new("greet"), process_greet_command);
///         Ok(())
///     }
/// }
///
/// fn process_greet_command(
///     _: &mut Context,
///     _: &ArgMatches,
/// ) -> Result<CommandResponse> {
///     Ok(CommandResponse::new("hello"))
/// }
///
/// # fn main() -> Result<()> {
/// let mut context = Context::new();
/// context.in_memory_db(true);
/// context.add_plugin(GreetPlugin)?;
/// context.startup()?;
/// assert_eq!(context.execute("greet")?.text().as_deref(), Some("hello"));
/// # Ok(())
/// # }
/// ```
pub struct Context {
    /// Type names of the plugins built into this context.
    plugins: Vec<&'static str>,

    /// The `Command`s registered with this `Context`, with the
    /// function that handles each of them.
    commands: Vec<(Command, ProcessCommandFn)>,

    /// Whether the db connection should be opened in memory.
    open_db_in_memory: bool,

    /// An explicit database file. Falls back to `DataDirs` when unset.
    db_path: Option<PathBuf>,

    resources: HashMap<TypeId, Box<dyn Resource>>,
}

impl Context {
    /// Creates a new Context, without any plugins,
    /// commands, or tables.
    pub fn new() -> Self {
        Self {
            plugins: Vec::default(),
            commands: Vec::default(),
            open_db_in_memory: false,
            db_path: None,
            resources: HashMap::new(),
        }
    }

    /// Builds a plugin into the context. Adding the same plugin type
    /// twice is a no-op.
    pub fn add_plugin<P>(&mut self, plugin: P) -> Result<&mut Self>
    where
        P: Plugin + 'static,
    {
        let name = std::any::type_name::<P>();
        if self.plugins.contains(&name) {
            return Ok(self);
        }
        self.plugins.push(name);
        plugin.build(self)?;
        Ok(self)
    }

    /// Returns `true` if a plugin of type `P` was added.
    pub fn has_plugin<P>(&self) -> bool
    where
        P: Plugin + 'static,
    {
        self.plugins.contains(&std::any::type_name::<P>())
    }

    /// Registers a new command with the context.
    ///
    /// * `command`: The command to register.
    /// * `process_command_fn`: Called with the parsed arguments
    ///   when the command is invoked.
    pub fn add_command(
        &mut self,
        command: Command,
        process_command_fn: ProcessCommandFn,
    ) -> &mut Self {
        self.commands.push((command, process_command_fn));
        self
    }

    /// Sets whether the database should be opened in memory.
    /// Defaults to `false`.
    pub fn in_memory_db(&mut self, in_memory: bool) -> &mut Self {
        self.open_db_in_memory = in_memory;
        self
    }

    /// Sets the database file to open on `startup`.
    pub fn db_path(&mut self, path: impl Into<PathBuf>) -> &mut Self {
        self.db_path = Some(path.into());
        self
    }

    /// Adds a `Resource`, replacing any existing one of the same type.
    pub fn add_resource<R>(&mut self, res: R)
    where
        R: Resource,
    {
        self.resources.insert(TypeId::of::<R>(), Box::new(res));
    }

    /// Removes a `Resource` by type and hands it back.
    pub fn remove_resource<R>(&mut self) -> Option<R>
    where
        R: Resource,
    {
        let boxed = self.resources.remove(&TypeId::of::<R>())?;
        let any: Box<dyn Any> = boxed.into_any();
        any.downcast::<R>().ok().map(|r| *r)
    }

    pub fn get_resource_mut<R>(&mut self) -> Option<&mut R>
    where
        R: Resource,
    {
        self.resources
            .get_mut(&TypeId::of::<R>())
            .and_then(|b| b.as_any_mut().downcast_mut::<R>())
    }

    pub fn get_resource<R>(&self) -> Option<&R>
    where
        R: Resource,
    {
        self.resources
            .get(&TypeId::of::<R>())
            .and_then(|b| b.as_any().downcast_ref::<R>())
    }

    /// Returns `true` if this `Context` has the specified `Resource` type.
    pub fn has_resource<R>(&self) -> bool
    where
        R: Resource,
    {
        self.resources.contains_key(&TypeId::of::<R>())
    }

    /// Call this after adding plugins. Opens the database and makes
    /// sure every registered table exists.
    pub fn startup(&mut self) -> Result<()> {
        let tables = self
            .get_resource::<DbTableConfigs>()
            .map(|t| t.configs().to_vec())
            .unwrap_or_default();

        let db_connection = if self.open_db_in_memory {
            DbConnection::open_in_memory(tables)?
        } else {
            let path = match &self.db_path {
                Some(p) => p.clone(),
                None => crate::DataDirs::locate()?.db_path(),
            };
            DbConnection::open_from_path(&path, tables)?
        };

        tracing::debug!(plugins = ?self.plugins, "context started");
        self.add_resource(db_connection);
        Ok(())
    }

    /// Executes a registered command from the given string. The
    /// string is split with shell quoting rules and parsed by `clap`.
    /// Parse failures, including `--help`, come back as
    /// `Error::Command` holding the rendered message.
    ///
    /// ```
    /// # use framework::prelude::*;
    /// # fn main() -> Result<()> {
    /// let mut context = Context::new();
    /// context.in_memory_db(true);
    /// context.startup()?;
    /// assert!(matches!(context.execute("--help"), Err(Error::Command(_))));
    /// # Ok(())
    /// # }
    /// ```
    pub fn execute(&mut self, command_str: &str) -> Result<CommandResponse> {
        let mut command = Command::new(BIN_NAME)
            .version(env!("CARGO_PKG_VERSION"))
            .about("Trainer Desk: browse and edit trainer profiles")
            .subcommand_required(true);

        for (c, _) in &self.commands {
            command = command.subcommand(c);
        }

        let args = shlex::split(&format!("{BIN_NAME} {command_str}"))
            .ok_or_else(|| Error::Command(format!("unbalanced quotes in {command_str:?}")))?
            .into_iter()
            .map(OsString::from)
            .collect::<Vec<_>>();

        let matches = command
            .try_get_matches_from(args)
            .map_err(|e| Error::Command(e.render().to_string()))?;

        let Some((name, sub_matches)) = matches.subcommand() else {
            return Err(Error::Command("no command given".into()));
        };

        let handler = self
            .commands
            .iter()
            .find(|(c, _)| c.get_name() == name)
            .map(|(_, f)| *f)
            .ok_or_else(|| Error::Command(format!("unknown command {name:?}")))?;

        tracing::debug!(command = name, "executing command");
        handler(self, sub_matches)
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

/// The result of running a successful command.
/// Optionally contains text to display.
#[derive(Default, Debug)]
pub struct CommandResponse {
    text: Option<String>,
}

impl CommandResponse {
    /// Creates a new CommandResponse with a text response. Use
    /// `Default::default()` for a response without text.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
        }
    }

    /// Gets a copy of the text of the response, if it exists.
    pub fn text(&self) -> Option<String> {
        self.text.clone()
    }
}

type ProcessCommandFn = fn(&mut Context, &ArgMatches) -> Result<CommandResponse>;

/// An interface for adding functionality to a Context. Inspired by
/// Bevy's plugin interface.
pub trait Plugin {
    /// Runs on adding the plugin to a Context. Register commands,
    /// tables and resources here.
    fn build(self, context: &mut Context) -> Result<()>;
}

/// A singleton data type managed by a `Context`. Implement it with
/// `impl_resource!` for concrete types.
pub trait Resource: Any {
    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

#[cfg(test)]
mod test {
    use crate::prelude::*;
    use clap::{Arg, ArgMatches, Command};

    #[derive(Clone)]
    struct TestPlugin;

    impl Plugin for TestPlugin {
        fn build(self, context: &mut Context) -> Result<()> {
            context
                .add_command(Command::new("ping"), process_ping_command)
                .add_command(
                    Command::new("echo").arg(Arg::new("text").required(true)),
                    process_echo_command,
                );
            context.add_resource(Counter::default());
            Ok(())
        }
    }

    #[derive(Default)]
    struct Counter {
        hits: i32,
    }

    impl_resource!(Counter);

    fn process_ping_command(
        context: &mut Context,
        _: &ArgMatches,
    ) -> Result<CommandResponse> {
        let counter = context
            .get_resource_mut::<Counter>()
            .ok_or(Error::new("missing counter"))?;
        counter.hits += 1;
        Ok(CommandResponse::default())
    }

    fn process_echo_command(
        _: &mut Context,
        matches: &ArgMatches,
    ) -> Result<CommandResponse> {
        let text = matches.get_one::<String>("text").cloned().unwrap_or_default();
        Ok(CommandResponse::new(text))
    }

    #[test]
    fn plugin_test() -> Result<()> {
        let mut context = Context::new();
        context.in_memory_db(true);
        context.add_plugin(TestPlugin)?;
        context.add_plugin(TestPlugin)?;
        assert_eq!(context.commands.len(), 2);
        assert!(context.has_plugin::<TestPlugin>());
        context.startup()?;

        let response = context.execute("ping")?;
        assert!(response.text().is_none());
        context.execute("ping")?;
        assert_eq!(context.get_resource::<Counter>().unwrap().hits, 2);

        let echoed = context.execute("echo 'two words'")?;
        assert_eq!(echoed.text().as_deref(), Some("two words"));
        Ok(())
    }

    #[test]
    fn bad_command_lines_are_errors() -> Result<()> {
        let mut context = Context::new();
        context.in_memory_db(true);
        context.add_plugin(TestPlugin)?;
        context.startup()?;

        assert!(matches!(context.execute("nope"), Err(Error::Command(_))));
        assert!(matches!(context.execute("echo"), Err(Error::Command(_))));
        assert!(matches!(context.execute("echo 'open"), Err(Error::Command(_))));
        Ok(())
    }

    #[test]
    fn remove_resource_returns_value() {
        let mut context = Context::new();
        context.add_resource(Counter { hits: 7 });
        let removed = context.remove_resource::<Counter>();
        assert_eq!(removed.map(|c| c.hits), Some(7));
        assert!(!context.has_resource::<Counter>());
    }
}
