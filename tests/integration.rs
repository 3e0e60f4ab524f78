//! End-to-end behaviour of composed pipelines, including thread hops.

use std::{
  sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    mpsc::channel,
    Arc, Mutex,
  },
  thread,
  time::Duration,
};

use rxcore::prelude::*;

const TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq)]
enum Event<T> {
  Next(T),
  Error(String),
  Complete,
}

/// Records every signal in arrival order.
fn record<T: Send + 'static>(source: &Observable<T>) -> (Arc<Mutex<Vec<Event<T>>>>, Subscription) {
  let log = Arc::new(Mutex::new(vec![]));
  let (n_log, e_log, c_log) = (log.clone(), log.clone(), log.clone());
  let subscription = source.subscribe_all(
    move |v| n_log.lock().unwrap().push(Event::Next(v)),
    move |e: RxError| e_log.lock().unwrap().push(Event::Error(e.to_string())),
    move || c_log.lock().unwrap().push(Event::Complete),
  );
  (log, subscription)
}

fn thread_name() -> String { thread::current().name().unwrap_or_default().to_owned() }

#[test]
fn exactly_one_terminal_signal_under_racing_producers() {
  for _ in 0..20 {
    let source = observable::create(|emitter: Emitter<usize>| {
      let workers: Vec<_> = (0..4)
        .map(|i| {
          let emitter = emitter.clone();
          thread::spawn(move || {
            for v in 0..50 {
              emitter.next(v);
            }
            if i % 2 == 0 {
              emitter.complete();
            } else {
              emitter.error(RxError::msg(format!("worker {i}")));
            }
            emitter.next(usize::MAX);
          })
        })
        .collect();
      for worker in workers {
        let _ = worker.join();
      }
      Ok(())
    });

    let (log, _) = record(&source);
    let log = log.lock().unwrap();
    let terminal_at: Vec<_> = log
      .iter()
      .enumerate()
      .filter(|(_, e)| !matches!(e, Event::Next(_)))
      .map(|(idx, _)| idx)
      .collect();
    assert_eq!(terminal_at.len(), 1);
    assert_eq!(terminal_at[0], log.len() - 1);
    assert!(!log.contains(&Event::Next(usize::MAX)));
  }
}

#[test]
fn cold_subscribers_are_independent() {
  let runs = Arc::new(AtomicUsize::new(0));
  let c_runs = runs.clone();
  let source = observable::create(move |emitter: Emitter<i32>| {
    c_runs.fetch_add(1, Ordering::SeqCst);
    (1..=3).for_each(|v| emitter.next(v));
    emitter.complete();
    Ok(())
  })
  .map(|v| v * 10);

  let (a, _) = record(&source);
  let (b, _) = record(&source);

  assert_eq!(runs.load(Ordering::SeqCst), 2);
  let expected = vec![Event::Next(10), Event::Next(20), Event::Next(30), Event::Complete];
  assert_eq!(*a.lock().unwrap(), expected);
  assert_eq!(*b.lock().unwrap(), expected);
}

#[test]
fn map_then_filter() {
  let (log, _) = record(&observable::from_iter(vec![1, 2, 3]).map(|x| x * 2).filter(|x| *x > 3));
  assert_eq!(*log.lock().unwrap(), vec![Event::Next(4), Event::Next(6), Event::Complete]);
}

#[test]
fn flat_map_flattens_and_completes_last() {
  let source = observable::from_iter(vec!["Hi", "Go"])
    .flat_map(|s| observable::from_iter(s.chars().collect::<Vec<_>>()));
  let (log, _) = record(&source);
  assert_eq!(
    *log.lock().unwrap(),
    vec![
      Event::Next('H'),
      Event::Next('i'),
      Event::Next('G'),
      Event::Next('o'),
      Event::Complete
    ]
  );
}

#[cfg(feature = "futures-scheduler")]
#[test]
fn flat_map_keeps_order_within_each_inner_across_threads() {
  let pool = ThreadPoolScheduler::builder()
    .pool_size(4)
    .name_prefix("merge-thread-")
    .create()
    .unwrap();
  let (tx, rx) = channel();
  let chars = Arc::new(Mutex::new(vec![]));
  let c_chars = chars.clone();

  observable::from_iter(vec!["alpha", "beta", "gamma"])
    .flat_map(move |s| {
      observable::from_iter(s.chars().collect::<Vec<_>>())
        .map(move |c| (s, c))
        .subscribe_on(pool.clone())
    })
    .subscribe_all(
      move |v| c_chars.lock().unwrap().push(v),
      |_| {},
      move || tx.send(()).unwrap(),
    );

  rx.recv_timeout(TIMEOUT).unwrap();
  let chars = chars.lock().unwrap();
  for word in ["alpha", "beta", "gamma"] {
    let rebuilt: String = chars.iter().filter(|(s, _)| *s == word).map(|(_, c)| *c).collect();
    assert_eq!(rebuilt, word);
  }
}

#[test]
fn operator_failure_halts_partial_results() {
  let source = observable::from_iter(vec![1, 2]).map_with_err(|x| {
    if x == 2 { Err(RxError::msg("bad")) } else { Ok(x) }
  });
  let (log, subscription) = record(&source);
  assert_eq!(*log.lock().unwrap(), vec![Event::Next(1), Event::Error("bad".to_owned())]);
  assert!(subscription.is_disposed());
}

#[test]
fn dispose_after_n_items_from_consumer() {
  let slot: Arc<Mutex<Option<Subscription>>> = Arc::default();
  let c_slot = slot.clone();
  let seen = Arc::new(AtomicUsize::new(0));
  let c_seen = seen.clone();
  let produced = Arc::new(AtomicUsize::new(0));
  let c_produced = produced.clone();

  let subscription = observable::create(move |emitter: Emitter<usize>| {
    while !emitter.is_disposed() {
      c_produced.fetch_add(1, Ordering::SeqCst);
      emitter.next(1);
      thread::yield_now();
    }
    Ok(())
  })
  .subscribe_on(IoScheduler::new())
  .subscribe(move |_| {
    if c_seen.fetch_add(1, Ordering::SeqCst) + 1 >= 5 {
      if let Some(s) = c_slot.lock().unwrap().as_ref() {
        s.dispose();
      }
    }
  });
  *slot.lock().unwrap() = Some(subscription.clone());

  let deadline = std::time::Instant::now() + TIMEOUT;
  while !subscription.is_disposed() && std::time::Instant::now() < deadline {
    thread::sleep(Duration::from_millis(1));
  }
  assert!(subscription.is_disposed());
  thread::sleep(Duration::from_millis(20));
  let seen = seen.load(Ordering::SeqCst);
  assert!(seen >= 5);
  // The producer noticed and stopped on its own.
  let produced_then = produced.load(Ordering::SeqCst);
  thread::sleep(Duration::from_millis(20));
  assert_eq!(produced.load(Ordering::SeqCst), produced_then);
}

#[test]
fn dispose_from_another_thread_stops_delivery() {
  let (started_tx, started_rx) = channel();
  let seen = Arc::new(AtomicUsize::new(0));
  let c_seen = seen.clone();
  let stopped = Arc::new(AtomicBool::new(false));
  let c_stopped = stopped.clone();

  let subscription = observable::create(move |emitter: Emitter<usize>| {
    let mut sent = 0;
    while !emitter.is_disposed() {
      emitter.next(sent);
      sent += 1;
      if sent == 10 {
        let _ = started_tx.send(());
      }
    }
    c_stopped.store(true, Ordering::SeqCst);
    Ok(())
  })
  .subscribe_on(IoScheduler::new())
  .subscribe(move |_| {
    c_seen.fetch_add(1, Ordering::SeqCst);
  });

  started_rx.recv_timeout(TIMEOUT).unwrap();
  subscription.dispose();
  let at_dispose = seen.load(Ordering::SeqCst);
  thread::sleep(Duration::from_millis(50));

  // At most the one delivery already in flight when dispose ran.
  assert!(seen.load(Ordering::SeqCst) <= at_dispose + 1);
  assert!(stopped.load(Ordering::SeqCst));
}

#[cfg(feature = "futures-scheduler")]
#[test]
fn observe_on_four_workers_keeps_order() {
  let pool = ThreadPoolScheduler::builder().pool_size(4).create().unwrap();
  let (tx, rx) = channel();
  let log = Arc::new(Mutex::new(vec![]));
  let c_log = log.clone();
  observable::from_iter(vec!['a', 'b', 'c'])
    .observe_on(pool)
    .subscribe_all(
      move |v| c_log.lock().unwrap().push(v),
      |_| {},
      move || tx.send(()).unwrap(),
    );
  rx.recv_timeout(TIMEOUT).unwrap();
  assert_eq!(*log.lock().unwrap(), vec!['a', 'b', 'c']);
}

#[cfg(feature = "futures-scheduler")]
#[test]
fn thread_hops_through_a_pipeline() {
  let computation = ThreadPoolScheduler::computation().unwrap();
  let single = ThreadPoolScheduler::single_thread().unwrap();
  let (tx, rx) = channel();
  let stages = Arc::new(Mutex::new(vec![]));
  let (p_stages, m_stages, s_stages) = (stages.clone(), stages.clone(), stages.clone());

  observable::create(move |emitter: Emitter<i32>| {
    p_stages.lock().unwrap().push(("produce", thread_name()));
    (1..=3).for_each(|v| emitter.next(v));
    emitter.complete();
    Ok(())
  })
  .subscribe_on(IoScheduler::new())
  .observe_on(computation.clone())
  .map(move |v| {
    m_stages.lock().unwrap().push(("map", thread_name()));
    v + 1
  })
  .observe_on(single.clone())
  .subscribe_all(
    move |v| s_stages.lock().unwrap().push(("consume", format!("{v}@{}", thread_name()))),
    |_| {},
    move || tx.send(()).unwrap(),
  );

  rx.recv_timeout(TIMEOUT).unwrap();
  let stages = stages.lock().unwrap();
  let on = |stage: &str| -> Vec<String> {
    stages.iter().filter(|(s, _)| *s == stage).map(|(_, t)| t.clone()).collect()
  };
  assert!(on("produce")[0].starts_with("io-thread-"));
  assert_eq!(on("map").len(), 3);
  assert!(on("map").iter().all(|t| t.starts_with("computation-thread-")));
  assert_eq!(
    on("consume"),
    vec!["2@single-thread-0", "3@single-thread-0", "4@single-thread-0"]
  );

  computation.shutdown();
  single.shutdown();
}

#[cfg(feature = "futures-scheduler")]
#[test]
fn shut_down_pool_fails_thread_hops() {
  let pool = ThreadPoolScheduler::builder().pool_size(2).create().unwrap();
  pool.shutdown();
  let shut_down = Event::Error("scheduler is shut down".to_owned());

  let (log, subscription) = record(&observable::from_iter(1..=3).subscribe_on(pool.clone()));
  assert_eq!(*log.lock().unwrap(), vec![shut_down.clone()]);
  assert!(subscription.is_disposed());

  let (log, subscription) = record(&observable::from_iter(1..=3).observe_on(pool));
  assert_eq!(*log.lock().unwrap(), vec![shut_down]);
  assert!(subscription.is_disposed());
}

#[test]
fn guard_disposes_when_scope_ends() {
  let slot: Arc<Mutex<Option<Emitter<i32>>>> = Arc::default();
  let c_slot = slot.clone();
  let source = observable::create(move |emitter: Emitter<i32>| {
    *c_slot.lock().unwrap() = Some(emitter);
    Ok(())
  });
  {
    let _guard = source.subscribe(|_| {}).dispose_when_dropped();
    assert!(!slot.lock().unwrap().as_ref().unwrap().is_disposed());
  }
  assert!(slot.lock().unwrap().as_ref().unwrap().is_disposed());
}

#[cfg(feature = "tokio-scheduler")]
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn tokio_handle_as_scheduler() {
  let handle = tokio::runtime::Handle::current();
  let (tx, rx) = channel();
  let values = Arc::new(Mutex::new(vec![]));
  let c_values = values.clone();

  observable::from_iter(0..100)
    .subscribe_on(handle.clone())
    .observe_on(handle)
    .subscribe_all(
      move |v| c_values.lock().unwrap().push(v),
      |_| {},
      move || tx.send(()).unwrap(),
    );

  tokio::task::spawn_blocking(move || rx.recv_timeout(TIMEOUT))
    .await
    .unwrap()
    .unwrap();
  assert_eq!(*values.lock().unwrap(), (0..100).collect::<Vec<_>>());
}
