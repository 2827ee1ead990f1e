use std::sync::{Arc, LazyLock};
use std::time::Duration;

use scopeline_context::{Snapshot, TaskSlot, Variable};
use scopeline_worker::{DrainBudget, Inheritance, TaskClass, WorkerJoinSet, WorkerRuntime, spawn, spawn_blocking, spawn_named_thread, spawn_thread};
use tokio::sync::{Notify, oneshot};

static TENANT: LazyLock<Variable<String>> = LazyLock::new(|| Variable::new().named("tenant"));
static LEVEL: LazyLock<Variable<u32>> = LazyLock::new(|| Variable::with_default(0).named("level"));

fn tenant() -> Option<String> {
	TENANT.get().map(|tenant| tenant.to_string())
}

#[tokio::test]
async fn child_inherits_or_starts_fresh() {
	let _ = tracing_subscriber::fmt::try_init();
	let (inherited, fresh) = TENANT
		.scope("acme".into(), async {
			let inherited = spawn(TaskClass::Interactive, Inheritance::Inherit, async { tenant() }).await.expect("inherit task");
			let fresh = spawn(TaskClass::Interactive, Inheritance::Fresh, async { (tenant(), *LEVEL.get().expect("default")) })
				.await
				.expect("fresh task");
			(inherited, fresh)
		})
		.await;
	assert_eq!(inherited.as_deref(), Some("acme"));
	assert_eq!(fresh, (None, 0));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn child_unaffected_by_parent_rebinding_after_spawn() {
	let parent_rebound = Arc::new(Notify::new());
	let (ready_tx, ready_rx) = oneshot::channel();

	let child = LEVEL
		.scope(1, {
			let parent_rebound = Arc::clone(&parent_rebound);
			async move {
				let child = spawn(TaskClass::Background, Inheritance::Inherit, {
					let parent_rebound = Arc::clone(&parent_rebound);
					async move {
						let before = *LEVEL.get().expect("inherited");
						let _ = ready_tx.send(());
						parent_rebound.notified().await;
						let after = *LEVEL.get().expect("inherited");
						(before, after)
					}
				});

				let _ = ready_rx.await;
				let inner = LEVEL
					.scope(2, async {
						let inner = *LEVEL.get().expect("rebound");
						parent_rebound.notify_one();
						tokio::time::sleep(Duration::from_millis(5)).await;
						inner
					})
					.await;
				assert_eq!(inner, 2);
				assert_eq!(*LEVEL.get().expect("outer restored"), 1);
				child
			}
		})
		.await;

	assert_eq!(child.await.expect("child task"), (1, 1));
}

#[tokio::test]
async fn child_outlives_parent_extent() {
	let (go_tx, go_rx) = oneshot::channel::<()>();
	let child = TENANT.run("short-lived".into(), || {
		spawn(TaskClass::Background, Inheritance::Inherit, async move {
			let _ = go_rx.await;
			tenant()
		})
	});
	assert!(TENANT.get().is_none());
	let _ = go_tx.send(());
	assert_eq!(child.await.expect("child task").as_deref(), Some("short-lived"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn ten_thousand_children_share_one_chain() {
	const CHILDREN: usize = 10_000;

	let mut set = WorkerJoinSet::new(TaskClass::Background);
	let parent_head = TENANT.run("fanout".into(), || {
		LEVEL.run(7, || {
			for i in 0..CHILDREN {
				set.spawn(Inheritance::Inherit, async move {
					if i % 2 == 0 {
						tokio::task::yield_now().await;
					}
					let inner = LEVEL.run(i as u32, || *LEVEL.get().expect("rebound"));
					(tenant(), *LEVEL.get().expect("inherited"), inner == i as u32)
				});
			}
			Snapshot::capture()
		})
	});
	assert_eq!(set.len(), CHILDREN);

	let results = set.join_all().await;
	assert_eq!(results.len(), CHILDREN);
	for result in results {
		let (tenant, level, inner_ok) = result.expect("child task");
		assert_eq!(tenant.as_deref(), Some("fanout"));
		assert_eq!(level, 7);
		assert!(inner_ok);
	}
	assert_eq!(parent_head.depth(), 2);
}

#[tokio::test]
async fn blocking_and_thread_spawns_follow_inheritance() {
	let (blocking, thread, named, fresh) = TENANT.run("blocking".into(), || {
		let blocking = spawn_blocking(TaskClass::CpuBlocking, Inheritance::Inherit, tenant);
		let thread = spawn_thread(TaskClass::IoBlocking, Inheritance::Inherit, tenant);
		let named = spawn_named_thread(TaskClass::IoBlocking, Inheritance::Inherit, "ctx-reader", || {
			(std::thread::current().name().map(str::to_string), tenant())
		})
		.expect("spawn named thread");
		let fresh = spawn_thread(TaskClass::IoBlocking, Inheritance::Fresh, tenant);
		(blocking, thread, named, fresh)
	});

	assert_eq!(blocking.await.expect("blocking job").as_deref(), Some("blocking"));
	assert_eq!(thread.join().expect("thread").as_deref(), Some("blocking"));
	assert_eq!(named.join().expect("named thread"), (Some("ctx-reader".to_string()), Some("blocking".to_string())));
	assert_eq!(fresh.join().expect("fresh thread"), None);
}

#[tokio::test]
async fn task_slots_are_not_inherited() {
	let slot = Arc::new(TaskSlot::<u32>::new());
	slot.set(11);
	let child = TENANT.run("slots".into(), || {
		let slot = Arc::clone(&slot);
		spawn(TaskClass::Interactive, Inheritance::Inherit, async move {
			let before = slot.get();
			slot.set(22);
			tokio::task::yield_now().await;
			(before, slot.get(), tenant())
		})
	});
	assert_eq!(child.await.expect("child task"), (None, Some(22), Some("slots".to_string())));
	assert_eq!(slot.get(), Some(11));
}

#[tokio::test]
async fn aborted_task_drops_inside_its_context() {
	struct ReportOnDrop(std::sync::mpsc::Sender<Option<String>>);

	impl Drop for ReportOnDrop {
		fn drop(&mut self) {
			let _ = self.0.send(tenant());
		}
	}

	let (tx, rx) = std::sync::mpsc::channel();
	let task = TENANT.run("aborted".into(), || {
		spawn(TaskClass::Background, Inheritance::Inherit, async move {
			let _reporter = ReportOnDrop(tx);
			std::future::pending::<()>().await;
		})
	});
	tokio::task::yield_now().await;
	task.abort();
	assert!(task.await.expect_err("aborted").is_cancelled());
	assert_eq!(rx.recv_timeout(Duration::from_secs(1)).expect("reporter dropped").as_deref(), Some("aborted"));
	assert!(TENANT.get().is_none());
}

#[tokio::test]
async fn runtime_submissions_inherit_and_cancel() {
	let rt = WorkerRuntime::new();
	let (seen_tx, mut seen_rx) = tokio::sync::mpsc::unbounded_channel();

	TENANT
		.scope("managed".into(), async {
			let seen_tx = seen_tx.clone();
			rt.submit(TaskClass::Interactive, Inheritance::Inherit, async move {
				let _ = seen_tx.send(tenant());
			})
			.await;
		})
		.await;

	let report = rt
		.drain(DrainBudget {
			duration: Duration::from_secs(1),
			max_completions: 8,
		})
		.await;
	assert_eq!(report.completed, 1);
	assert_eq!(seen_rx.recv().await.flatten().as_deref(), Some("managed"));

	rt.submit(TaskClass::Background, Inheritance::Fresh, async { std::future::pending::<()>().await }).await;
	rt.cancel();
	assert!(rt.is_cancelled());
	let report = rt.drain(DrainBudget::default()).await;
	assert_eq!(report.completed, 1);
	assert_eq!(report.pending_background, 0);
}
