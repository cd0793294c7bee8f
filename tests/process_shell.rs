#![cfg(unix)]

use std::{thread, time::Duration};

use task_shell_harness::{
    HarnessError, PollConfig, ProcessShell, Shell, ShellConfig, TaskCommandTemplate,
};

const FAKE_SHELL: &str = r#"
printf 'Welcome to the fake shell\ndataflow:>'
while IFS= read -r line; do
  case "$line" in
    exit) exit 0 ;;
    'task create t1 --definition "timestamp"') echo "Created new task 't1'" ;;
    'task list')
      echo '+---------+---------+'
      echo '|Task Name|Def      |'
      echo '+---------+---------+'
      echo '|t1       |timestamp|'
      echo '+---------+---------+'
      ;;
    'task destroy --name t1') echo "Destroyed task 't1'" ;;
    'task destroy --name good') echo "Destroyed task 'good'" ;;
    'task destroy --name bad') echo "Command failed: no task named bad" >&2 ;;
    slow) sleep 1; echo "slow output" ;;
    *) echo "Command failed: unknown command $line" ;;
  esac
  printf 'dataflow:>'
done
"#;

fn fake_config() -> ShellConfig {
    ShellConfig {
        program: "sh".to_string(),
        args: vec!["-c".to_string(), FAKE_SHELL.to_string()],
        response_timeout_ms: 5_000,
        startup_timeout_ms: 5_000,
        ..ShellConfig::default()
    }
}

#[test]
fn banner_is_captured_before_first_prompt() {
    let shell = ProcessShell::spawn(fake_config()).unwrap();
    assert_eq!(shell.banner().trim(), "Welcome to the fake shell");
}

#[test]
fn create_verify_and_destroy_through_process() {
    let shell = ProcessShell::spawn(fake_config()).unwrap();
    let poll = PollConfig {
        interval_ms: 1,
        max_wait_ms: 1,
    };
    let mut tasks = TaskCommandTemplate::with_poll(shell, poll);

    tasks.create("t1", "timestamp", &[]).unwrap();
    assert_eq!(tasks.registry().names(), ["t1"]);

    tasks.destroy_created_tasks().unwrap();
    assert!(tasks.registry().is_empty());
}

#[test]
fn rejected_command_is_an_unsuccessful_result() {
    let mut shell = ProcessShell::spawn(fake_config()).unwrap();
    let cr = shell.execute("task validate nope").unwrap();
    assert!(!cr.success);
    assert_eq!(cr.rendering, "Command failed: unknown command task validate nope");
}

#[test]
fn table_responses_are_parsed() {
    let mut shell = ProcessShell::spawn(fake_config()).unwrap();
    let cr = shell.execute("task list").unwrap();
    let table = cr.table.unwrap();
    assert_eq!(table.row_count(), 2);
    assert_eq!(table.value(1, 1), Some("timestamp"));
}

#[test]
fn missing_prompt_times_out() {
    let config = ShellConfig {
        response_timeout_ms: 100,
        ..fake_config()
    };
    let mut shell = ProcessShell::spawn(config).unwrap();
    assert!(matches!(
        shell.execute("slow"),
        Err(HarnessError::ResponseTimeout(_))
    ));
}

#[test]
fn exited_shell_is_reported() {
    let mut shell = ProcessShell::spawn(fake_config()).unwrap();
    assert!(matches!(
        shell.execute("exit"),
        Err(HarnessError::ShellExited)
    ));
}

#[test]
fn missing_program_fails_to_spawn() {
    let config = ShellConfig {
        program: "/nonexistent/dataflow-shell".to_string(),
        ..ShellConfig::default()
    };
    assert!(matches!(
        ProcessShell::spawn(config),
        Err(HarnessError::Spawn { .. })
    ));
}

#[test]
fn late_output_is_discarded_after_timeout() {
    let config = ShellConfig {
        response_timeout_ms: 200,
        ..fake_config()
    };
    let mut shell = ProcessShell::spawn(config).unwrap();
    assert!(matches!(
        shell.execute("slow"),
        Err(HarnessError::ResponseTimeout(_))
    ));
    thread::sleep(Duration::from_millis(1500));

    let cr = shell.execute("task list").unwrap();
    assert!(!cr.rendering.contains("slow output"));
    assert_eq!(cr.table.unwrap().value(1, 1), Some("timestamp"));

    let cr = shell.execute("task validate x").unwrap();
    assert_eq!(cr.rendering, "Command failed: unknown command task validate x");
}

#[test]
fn stderr_errors_stay_with_their_command() {
    let shell = ProcessShell::spawn(fake_config()).unwrap();
    let mut tasks = TaskCommandTemplate::new(shell);
    for _ in 0..20 {
        assert!(matches!(
            tasks.destroy_task("bad"),
            Err(HarnessError::DestroyFailed { .. })
        ));
        tasks.destroy_task("good").unwrap();
    }
}
