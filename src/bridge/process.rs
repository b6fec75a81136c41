//! Out-of-process bridge for script handler modules.
//!
//! # Responsibilities
//! - Spawn the configured interpreter for the module's language
//! - Hand it a small shim that loads the module and calls the method function
//! - Pass the canonical request as JSON on stdin
//! - Read `{"kind": "text" | "value", "result": ...}` back from stdout
//!
//! # Design Decisions
//! - One child process per invocation; no interpreter state survives a request
//! - Module path and function name travel in environment variables, so the
//!   same shim works for every interpreter wrapper (`node`, `tsx`, ...)
//! - Handler writes to stdout are redirected to stderr by the shim
//! - Children are killed when the invocation future is dropped (timeout)
//! - stderr is logged, never returned to the caller

use std::io;
use std::process::Stdio;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::bridge::{InvocationBridge, InvocationError};
use crate::config::{RuntimeCommand, RuntimesConfig};
use crate::envelope::{HandlerResult, RequestEnvelope};
use crate::handler::{EntryPoint, Language, ModuleKind, ScriptModule};

/// Environment variable carrying the module file path.
pub const MODULE_ENV: &str = "POLYGLOT_MODULE";
/// Environment variable carrying the function name.
pub const FUNCTION_ENV: &str = "POLYGLOT_FUNCTION";

const STDERR_LOG_LIMIT: usize = 2048;

const JS_SHIM: &str = r#"
const fs = require('fs');
const path = require('path');
const { pathToFileURL } = require('url');
const out = process.stdout.write.bind(process.stdout);
console.log = console.info = console.debug = console.error;

async function load(file, name) {
  const src = fs.readFileSync(file, 'utf8');
  if (/^export\s/m.test(src) || file.endsWith('.ts') || file.endsWith('.mjs')) {
    const mod = await import(pathToFileURL(file).href);
    return mod[name] ?? (mod.default && mod.default[name]);
  }
  const module = { exports: {} };
  const factory = new Function('module', 'exports', 'require', '__filename', '__dirname',
    src + '\n;return typeof ' + name + " === 'function' ? " + name + ' : module.exports.' + name + ';');
  return factory(module, module.exports, require, file, path.dirname(file));
}

let input = '';
process.stdin.setEncoding('utf8');
process.stdin.on('data', (chunk) => { input += chunk; });
process.stdin.on('end', async () => {
  const file = path.resolve(process.env.POLYGLOT_MODULE);
  const name = process.env.POLYGLOT_FUNCTION;
  const fn = await load(file, name);
  if (typeof fn !== 'function') {
    throw new Error(name + ' is not exported by ' + file);
  }
  const result = await fn(JSON.parse(input));
  const kind = typeof result === 'string' ? 'text' : 'value';
  out(JSON.stringify({ kind, result }));
});
"#;

const PY_SHIM: &str = r#"
import asyncio, importlib.util, inspect, json, os, sys
out = sys.stdout
sys.stdout = sys.stderr

async def settle(value):
    return await value

request = json.loads(sys.stdin.read())
spec = importlib.util.spec_from_file_location("handler", os.environ["POLYGLOT_MODULE"])
module = importlib.util.module_from_spec(spec)
spec.loader.exec_module(module)
result = getattr(module, os.environ["POLYGLOT_FUNCTION"])(request)
if inspect.isawaitable(result):
    result = asyncio.run(settle(result))
kind = "text" if isinstance(result, str) else "value"
out.write(json.dumps({"kind": kind, "result": result}))
out.flush()
"#;

const RB_SHIM: &str = r#"
require 'json'
out = STDOUT
$stdout = $stderr
request = JSON.parse($stdin.read)
load ENV.fetch('POLYGLOT_MODULE')
result = send(ENV.fetch('POLYGLOT_FUNCTION').to_sym, request)
kind = result.is_a?(String) ? 'text' : 'value'
out.write(JSON.generate({ 'kind' => kind, 'result' => result }))
out.flush
"#;

/// What the shim prints on stdout.
#[derive(Debug, Deserialize)]
struct ShimOutput {
    kind: String,
    result: Option<Value>,
}

/// Runs script handlers in interpreter child processes.
#[derive(Debug, Clone, Default)]
pub struct ProcessBridge {
    runtimes: RuntimesConfig,
}

impl ProcessBridge {
    pub fn new(runtimes: RuntimesConfig) -> Self {
        Self { runtimes }
    }

    /// Build the interpreter command for `function` of `module`.
    pub fn command(&self, module: &ScriptModule, function: &str) -> Option<Command> {
        let (runtime, flag, shim) = match module.language() {
            Language::JavaScript => (&self.runtimes.javascript, "-e", JS_SHIM),
            Language::TypeScript => (&self.runtimes.typescript, "-e", JS_SHIM),
            Language::Python => (&self.runtimes.python, "-c", PY_SHIM),
            Language::Ruby => (&self.runtimes.ruby, "-e", RB_SHIM),
            Language::Rust => return None,
        };

        let mut cmd = base_command(runtime);
        cmd.arg(flag)
            .arg(shim)
            .env(MODULE_ENV, module.path())
            .env(FUNCTION_ENV, function);
        if let Some(dir) = module.path().parent().filter(|d| !d.as_os_str().is_empty()) {
            cmd.current_dir(dir);
        }
        Some(cmd)
    }
}

fn base_command(runtime: &RuntimeCommand) -> Command {
    let mut cmd = Command::new(&runtime.program);
    cmd.args(&runtime.args);
    cmd
}

#[async_trait]
impl InvocationBridge for ProcessBridge {
    async fn invoke(
        &self,
        entry: &EntryPoint,
        request: RequestEnvelope,
    ) -> Result<HandlerResult, InvocationError> {
        let ModuleKind::Script(module) = entry.module().kind() else {
            return Err(InvocationError::Crashed(format!(
                "{} is not a script module",
                entry.module().name()
            )));
        };
        let cmd = self.command(module, entry.function_name()).ok_or_else(|| {
            InvocationError::Crashed(format!("no runtime for {}", module.language()))
        })?;
        let input = request
            .to_json()
            .map_err(|e| InvocationError::Crashed(format!("failed to encode request: {e}")))?;

        run_shim(cmd, &input).await
    }
}

/// Spawn `cmd`, feed it `input` on stdin and decode the shim output.
pub async fn run_shim(mut cmd: Command, input: &str) -> Result<HandlerResult, InvocationError> {
    cmd.stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let program = format!("{:?}", cmd.as_std().get_program());
    let mut child = cmd.spawn().map_err(|e| spawn_error(&program, e))?;

    let stdin = child.stdin.take();
    let payload = input.as_bytes().to_vec();
    let write = async move {
        if let Some(mut stdin) = stdin {
            stdin.write_all(&payload).await?;
            stdin.shutdown().await?;
        }
        Ok::<_, io::Error>(())
    };

    let (written, output) = tokio::join!(write, child.wait_with_output());
    let output = output.map_err(|e| InvocationError::Transient(format!("lost child process: {e}")))?;
    if let Err(e) = written {
        // The handler may legitimately ignore its input.
        tracing::debug!(program = %program, error = %e, "Could not write request to child stdin");
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    if !output.status.success() {
        tracing::warn!(
            program = %program,
            status = %output.status,
            stderr = %tail(&stderr, STDERR_LOG_LIMIT),
            "Handler process failed"
        );
        return Err(InvocationError::Crashed(format!("process exited with {}", output.status)));
    }
    if !stderr.trim().is_empty() {
        tracing::debug!(program = %program, stderr = %tail(&stderr, STDERR_LOG_LIMIT), "Handler output");
    }

    decode_shim_output(&output.stdout)
}

/// Decode the shim's stdout into a handler result.
pub fn decode_shim_output(stdout: &[u8]) -> Result<HandlerResult, InvocationError> {
    let text = std::str::from_utf8(stdout)
        .map_err(|_| InvocationError::MalformedResult("output is not UTF-8".to_string()))?;
    let output: ShimOutput = serde_json::from_str(text.trim())
        .map_err(|e| InvocationError::MalformedResult(format!("unreadable shim output: {e}")))?;

    match (output.kind.as_str(), output.result) {
        ("text", Some(Value::String(text))) => Ok(HandlerResult::Text(text)),
        ("value", Some(value)) => Ok(HandlerResult::Value(value)),
        (_, None) => Err(InvocationError::MalformedResult("handler returned nothing".to_string())),
        (kind, Some(_)) => Err(InvocationError::MalformedResult(format!(
            "unexpected result kind `{kind}`"
        ))),
    }
}

fn spawn_error(program: &str, e: io::Error) -> InvocationError {
    match e.kind() {
        io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied => {
            InvocationError::Crashed(format!("cannot start runtime {program}: {e}"))
        }
        _ => InvocationError::Transient(format!("failed to spawn {program}: {e}")),
    }
}

fn tail(s: &str, limit: usize) -> &str {
    if s.len() <= limit {
        return s;
    }
    let mut start = s.len() - limit;
    while !s.is_char_boundary(start) {
        start += 1;
    }
    &s[start..]
}
