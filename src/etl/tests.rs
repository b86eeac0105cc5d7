use super::*;
use crate::hooks::{Event, Topic};
use serde_json::{json, Value};
use std::cell::RefCell;
use std::rc::Rc;

// Mock loader recording every call it receives
#[derive(Default)]
struct Recorder {
    inits: usize,
    loads: Vec<Vec<(Key, &'static str)>>,
    commits: Vec<bool>,
    rollbacks: usize,
    failing: bool,
}

impl Recorder {
    fn failing() -> Self {
        Recorder {
            failing: true,
            ..Recorder::default()
        }
    }

    fn loaded(&self) -> Vec<&'static str> {
        self.loads.iter().flatten().map(|(_, value)| *value).collect()
    }
}

impl Loader<&'static str> for Recorder {
    fn init(&mut self) -> Result<(), EtlError> {
        self.inits += 1;
        Ok(())
    }

    fn load(
        &mut self,
        pairs: Cursor<'_, &'static str>,
        _key: &Key,
        _decision: &mut Decision,
    ) -> Result<(), EtlError> {
        if self.failing {
            return Err(EtlError::msg("sink unavailable"));
        }
        self.loads
            .push(pairs.map(|(key, value)| (key.clone(), *value)).collect());
        Ok(())
    }

    fn commit(&mut self, partial: bool) -> Result<(), EtlError> {
        self.commits.push(partial);
        Ok(())
    }

    fn rollback(&mut self) -> Result<(), EtlError> {
        self.rollbacks += 1;
        Ok(())
    }
}

type Log = Rc<RefCell<Vec<String>>>;

/// Subscribes a listener on every topic that records a short description of
/// each event.
fn observe<D: 'static, U: 'static>(
    tool: EtlTool<D, &'static str, U>,
) -> (EtlTool<D, &'static str, U>, Log) {
    let log: Log = Rc::new(RefCell::new(Vec::new()));
    let mut tool = tool;
    for topic in Topic::ALL {
        let log = Rc::clone(&log);
        tool = tool.on(
            topic,
            100,
            move |event: &mut Event<'_, &'static str>| -> Result<(), EtlError> {
                let entry = match (event.item(), event.counter()) {
                    (Some(item), _) => format!("{} {}", topic, item),
                    (None, Some(counter)) if topic == Topic::Flush && event.is_partial() => {
                        format!("{} {} partial", topic, counter)
                    }
                    (None, Some(counter)) => format!("{} {}", topic, counter),
                    (None, None) => topic.to_string(),
                };
                log.borrow_mut().push(entry);
                Ok(())
            },
        );
    }
    (tool, log)
}

fn pipeline(
    recorder: &Rc<RefCell<Recorder>>,
) -> EtlTool<Vec<&'static str>, &'static str> {
    EtlTool::new().loader(Rc::clone(recorder))
}

fn events(log: &Log, topic: Topic) -> Vec<String> {
    log.borrow()
        .iter()
        .filter(|entry| entry.split(' ').next() == Some(topic.as_str()))
        .cloned()
        .collect()
}

#[test]
fn test_happy_path_loads_each_item_once() {
    let recorder = Rc::new(RefCell::new(Recorder::default()));
    let (tool, log) = observe(pipeline(&recorder));
    let mut etl = tool.build().unwrap();

    let summary = etl.process(vec!["a", "b"]).unwrap();

    assert_eq!(summary, RunSummary { total: 2, rolled_back: false });
    let recorder = recorder.borrow();
    assert_eq!(
        recorder.loads,
        vec![vec![(Key::Index(0), "a")], vec![(Key::Index(1), "b")]]
    );
    assert_eq!(recorder.inits, 1);
    assert_eq!(recorder.commits, vec![false]);
    assert_eq!(
        *log.borrow(),
        vec![
            "start",
            "extract a",
            "transform a",
            "loader-init a",
            "load a",
            "extract b",
            "transform b",
            "load b",
            "flush 2",
            "end 2",
        ]
    );
}

#[test]
fn test_transform_skip() {
    let recorder = Rc::new(RefCell::new(Recorder::default()));
    let tool = pipeline(&recorder)
        .transform_with(|item: &&'static str, key: &Key, decision: &mut Decision| {
            if *item == "b" {
                decision.skip_current_item();
            }
            Ok(Pairs::once(key.clone(), *item))
        })
        .loader(Rc::clone(&recorder));
    let (tool, log) = observe(tool);
    let mut etl = tool.build().unwrap();

    let summary = etl.process(vec!["a", "b", "c"]).unwrap();

    assert_eq!(recorder.borrow().loaded(), vec!["a", "c"]);
    assert_eq!(summary.total, 2);
    assert_eq!(events(&log, Topic::Skip), vec!["skip b"]);
    assert_eq!(events(&log, Topic::End), vec!["end 2"]);
}

#[test]
fn test_stop_with_rollback() {
    let recorder = Rc::new(RefCell::new(Recorder::default()));
    let tool = pipeline(&recorder)
        .transform_with(|item: &&'static str, key: &Key, decision: &mut Decision| {
            if *item == "b" {
                decision.stop_process(true);
            }
            Ok(Pairs::once(key.clone(), *item))
        })
        .loader(Rc::clone(&recorder));
    let (tool, log) = observe(tool);
    let mut etl = tool.build().unwrap();

    let summary = etl.process(vec!["a", "b", "c"]).unwrap();

    assert_eq!(summary, RunSummary { total: 0, rolled_back: true });
    let recorder = recorder.borrow();
    assert_eq!(recorder.loaded(), vec!["a"]);
    assert_eq!(recorder.rollbacks, 1);
    assert!(recorder.commits.is_empty());
    assert_eq!(events(&log, Topic::Rollback), vec!["rollback 1"]);
    assert_eq!(events(&log, Topic::End), vec!["end 0"]);
}

#[test]
fn test_stop_without_rollback_flushes() {
    let recorder = Rc::new(RefCell::new(Recorder::default()));
    let tool = pipeline(&recorder).on_load(|event| {
        if event.item() == Some(&"b") {
            event.stop_process(false);
        }
        Ok(())
    });
    let (tool, log) = observe(tool);
    let mut etl = tool.build().unwrap();

    let summary = etl.process(vec!["a", "b", "c"]).unwrap();

    assert_eq!(summary, RunSummary { total: 2, rolled_back: false });
    assert_eq!(recorder.borrow().loaded(), vec!["a", "b"]);
    assert_eq!(recorder.borrow().commits, vec![false]);
    assert_eq!(events(&log, Topic::Flush), vec!["flush 2"]);
    assert!(events(&log, Topic::Extract).contains(&"extract c".to_string()));
}

#[test]
fn test_flush_threshold() {
    let recorder = Rc::new(RefCell::new(Recorder::default()));
    let (tool, log) = observe(pipeline(&recorder).flush_count(2));
    let mut etl = tool.build().unwrap();

    etl.process(vec!["a", "b", "c", "d"]).unwrap();

    assert_eq!(recorder.borrow().commits, vec![true, true, false]);
    assert_eq!(
        events(&log, Topic::Flush),
        vec!["flush 2 partial", "flush 2 partial", "flush 0"]
    );
    assert_eq!(etl.counters(), Counters { since_flush: 0, total: 4 });
}

#[test]
fn test_load_failure_is_fatal_by_default() {
    let recorder = Rc::new(RefCell::new(Recorder::failing()));
    let (tool, log) = observe(pipeline(&recorder));
    let mut etl = tool.build().unwrap();

    let err = etl.process(vec!["a", "b"]).unwrap_err();

    assert_eq!(err.to_string(), "sink unavailable");
    assert_eq!(etl.counters(), Counters { since_flush: 0, total: 0 });
    assert_eq!(events(&log, Topic::LoadException), vec!["load-exception a"]);
    assert!(events(&log, Topic::End).is_empty());
    assert!(recorder.borrow().commits.is_empty());
}

#[test]
fn test_load_failure_ignored() {
    let recorder = Rc::new(RefCell::new(Recorder::failing()));
    let tool = pipeline(&recorder).on_load_exception(|event| {
        event.ignore_exception();
        Ok(())
    });
    let (tool, log) = observe(tool);
    let mut etl = tool.build().unwrap();

    let summary = etl.process(vec!["a", "b", "c"]).unwrap();

    assert_eq!(summary.total, 0);
    assert!(recorder.borrow().loaded().is_empty());
    assert_eq!(events(&log, Topic::LoadException).len(), 3);
    assert!(events(&log, Topic::Load).is_empty());
    assert_eq!(events(&log, Topic::End), vec!["end 0"]);
}

#[test]
fn test_consecutive_runs_behave_identically() {
    let recorder = Rc::new(RefCell::new(Recorder::default()));
    let (tool, log) = observe(pipeline(&recorder).flush_count(2));
    let mut etl = tool.build().unwrap();

    let first = etl.process(vec!["a", "b", "c"]).unwrap();
    let first_log = log.borrow_mut().drain(..).collect::<Vec<_>>();
    let second = etl.process(vec!["a", "b", "c"]).unwrap();

    assert_eq!(first, second);
    assert_eq!(first_log, *log.borrow());
    assert_eq!(recorder.borrow().inits, 2);
    assert_eq!(recorder.borrow().commits, vec![true, false, true, false]);
}

#[test]
fn test_stop_does_not_leak_into_next_run() {
    let recorder = Rc::new(RefCell::new(Recorder::default()));
    let stopped = Rc::new(RefCell::new(false));
    let once = Rc::clone(&stopped);
    let mut etl = pipeline(&recorder)
        .on_load(move |event| {
            if !*once.borrow() {
                *once.borrow_mut() = true;
                event.stop_process(true);
            }
            Ok(())
        })
        .build()
        .unwrap();

    let first = etl.process(vec!["a", "b"]).unwrap();
    let second = etl.process(vec!["a", "b"]).unwrap();

    assert_eq!(first, RunSummary { total: 0, rolled_back: true });
    assert_eq!(second, RunSummary { total: 2, rolled_back: false });
}

#[test]
fn test_null_extraction_is_empty() {
    let recorder = Rc::new(RefCell::new(Recorder::default()));
    let tool = EtlTool::extract_with(|_input: (), _decision: &mut Decision| {
        Ok(None::<Vec<&'static str>>)
    })
    .loader(Rc::clone(&recorder));
    let (tool, log) = observe(tool);
    let mut etl = tool.build().unwrap();

    let summary = etl.process(()).unwrap();

    assert_eq!(summary.total, 0);
    assert_eq!(recorder.borrow().inits, 0);
    assert_eq!(*log.borrow(), vec!["start", "flush 0", "end 0"]);
}

#[test]
fn test_scalar_json_is_not_extractable() {
    let started = Rc::new(RefCell::new(0));
    let counter = Rc::clone(&started);
    let mut etl = EtlTool::<Value, Value>::new()
        .load_with(|_pairs, _key, _decision| Ok(()))
        .on_start(move |_event| {
            *counter.borrow_mut() += 1;
            Ok(())
        })
        .build()
        .unwrap();

    let err = etl.process(json!(23)).unwrap_err();

    assert!(matches!(err, EtlError::ExtractContract { found: "number" }));
    assert!(!err.is_recoverable());
    assert_eq!(*started.borrow(), 1);

    let summary = etl.process(json!(["x", "y"])).unwrap();
    assert_eq!(summary.total, 2);
}

#[test]
fn test_transform_must_produce_a_sequence() {
    let raised = Rc::new(RefCell::new(false));
    let flag = Rc::clone(&raised);
    let mut etl = EtlTool::<Value, Value>::new()
        .transform_with(|item: &Value, _key: &Key, _decision: &mut Decision| {
            Pairs::try_from_json(item.clone())
        })
        .load_with(|_pairs, _key, _decision| Ok(()))
        .on_transform_exception(move |_event| {
            *flag.borrow_mut() = true;
            Ok(())
        })
        .build()
        .unwrap();

    let err = etl.process(json!([1])).unwrap_err();

    assert!(matches!(err, EtlError::TransformContract { found: "number" }));
    assert!(!*raised.borrow());
}

#[test]
fn test_transform_may_fan_out() {
    let loads = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&loads);
    let mut etl = EtlTool::<Vec<&'static str>, &'static str>::new()
        .transform_with(|item: &&'static str, key: &Key, _decision: &mut Decision| {
            let item = *item;
            let index = key.as_index().unwrap_or_default();
            Ok(Pairs::from_iter(
                item.chars()
                    .enumerate()
                    .map(move |(i, c)| (Key::Name(format!("{}.{}", index, i)), c)),
            ))
        })
        .load_with(move |pairs: Cursor<'_, char>, key: &Key, _decision: &mut Decision| {
            assert_eq!(pairs.len(), 2);
            let replay: Vec<_> = pairs.clone().collect();
            let values: Vec<String> = pairs.map(|(k, c)| format!("{}={}", k, c)).collect();
            assert_eq!(replay.len(), values.len());
            sink.borrow_mut().push((key.clone(), values));
            Ok(())
        })
        .build()
        .unwrap();

    etl.process(vec!["ab", "cd"]).unwrap();

    assert_eq!(
        *loads.borrow(),
        vec![
            (Key::Index(0), vec!["0.0=a".to_string(), "0.1=b".to_string()]),
            (Key::Index(1), vec!["1.0=c".to_string(), "1.1=d".to_string()]),
        ]
    );
}

fn broken_source(
    _input: (),
    _decision: &mut Decision,
) -> Result<Pairs<&'static str>, EtlError> {
    Ok(Pairs::from_results(vec![
        Ok((Key::Index(0), "a")),
        Err(EtlError::msg("corrupted row")),
        Ok((Key::Index(2), "c")),
    ]))
}

#[test]
fn test_extract_source_error_rethrown() {
    let recorder = Rc::new(RefCell::new(Recorder::default()));
    let (tool, log) = observe(EtlTool::extract_with(broken_source).loader(Rc::clone(&recorder)));
    let mut etl = tool.build().unwrap();

    let err = etl.process(()).unwrap_err();

    assert_eq!(err.to_string(), "corrupted row");
    assert_eq!(recorder.borrow().loaded(), vec!["a"]);
    assert_eq!(events(&log, Topic::ExtractException), vec!["extract-exception a"]);
    assert!(events(&log, Topic::End).is_empty());
}

#[test]
fn test_extract_source_error_ignored() {
    let recorder = Rc::new(RefCell::new(Recorder::default()));
    let mut etl = EtlTool::extract_with(broken_source)
        .loader(Rc::clone(&recorder))
        .on_extract_exception(|event| {
            event.ignore_exception();
            Ok(())
        })
        .build()
        .unwrap();

    let summary = etl.process(()).unwrap();

    assert_eq!(summary.total, 1);
    assert_eq!(recorder.borrow().loaded(), vec!["a"]);
    assert_eq!(recorder.borrow().commits, vec![false]);
}

#[test]
fn test_extract_callback_error_propagates() {
    let recorder = Rc::new(RefCell::new(Recorder::default()));
    let (tool, log) = observe(
        EtlTool::extract_with(|_input: (), _decision: &mut Decision| {
            Err::<Vec<&'static str>, _>(EtlError::msg("source offline"))
        })
        .loader(Rc::clone(&recorder)),
    );
    let mut etl = tool.build().unwrap();

    let err = etl.process(()).unwrap_err();

    assert_eq!(err.to_string(), "source offline");
    assert_eq!(*log.borrow(), vec!["start"]);
}

#[test]
fn test_extract_listener_errors_drop_items() {
    let recorder = Rc::new(RefCell::new(Recorder::default()));
    let mut etl = pipeline(&recorder)
        .on_extract(|_event| Err(EtlError::msg("rejected")))
        .build()
        .unwrap();

    let summary = etl.process(vec!["a", "b", "c"]).unwrap();

    assert_eq!(summary.total, 0);
    assert!(recorder.borrow().loaded().is_empty());
    assert_eq!(recorder.borrow().inits, 0);
}

#[test]
fn test_extract_listener_skip() {
    let recorder = Rc::new(RefCell::new(Recorder::default()));
    let transformed = Rc::new(RefCell::new(Vec::new()));
    let seen = Rc::clone(&transformed);
    let tool = pipeline(&recorder)
        .on_extract(|event| {
            if event.item() == Some(&"b") {
                event.skip_current_item();
            }
            Ok(())
        })
        .on_transform(move |event| {
            if let Some(item) = event.item() {
                seen.borrow_mut().push(*item);
            }
            Ok(())
        });
    let (tool, log) = observe(tool);
    let mut etl = tool.build().unwrap();

    etl.process(vec!["a", "b", "c"]).unwrap();

    assert_eq!(*transformed.borrow(), vec!["a", "c"]);
    assert_eq!(recorder.borrow().loaded(), vec!["a", "c"]);
    assert_eq!(events(&log, Topic::Skip), vec!["skip b"]);
}

#[test]
fn test_transform_error_rethrown() {
    let recorder = Rc::new(RefCell::new(Recorder::default()));
    let mut etl = pipeline(&recorder)
        .transform_with(|item: &&'static str, key: &Key, _decision: &mut Decision| {
            if *item == "b" {
                return Err(EtlError::msg("cannot transform b"));
            }
            Ok(Pairs::once(key.clone(), *item))
        })
        .loader(Rc::clone(&recorder))
        .build()
        .unwrap();

    let err = etl.process(vec!["a", "b", "c"]).unwrap_err();

    assert_eq!(err.to_string(), "cannot transform b");
    assert_eq!(recorder.borrow().loaded(), vec!["a"]);
    assert_eq!(etl.counters(), Counters { since_flush: 1, total: 1 });
}

#[test]
fn test_transform_error_ignored_skips_item() {
    let recorder = Rc::new(RefCell::new(Recorder::default()));
    let tool = pipeline(&recorder)
        .transform_with(|item: &&'static str, key: &Key, _decision: &mut Decision| {
            let (item, key) = (*item, key.clone());
            Ok(Pairs::from_results(vec![
                Ok((key, item)),
                if item == "b" {
                    Err(EtlError::msg("half-way failure"))
                } else {
                    Ok((Key::from("extra"), item))
                },
            ]))
        })
        .loader(Rc::clone(&recorder))
        .on_transform_exception(|event| {
            event.ignore_exception();
            Ok(())
        });
    let (tool, log) = observe(tool);
    let mut etl = tool.build().unwrap();

    let summary = etl.process(vec!["a", "b", "c"]).unwrap();

    assert_eq!(summary.total, 2);
    assert_eq!(recorder.borrow().loaded(), vec!["a", "a", "c", "c"]);
    assert_eq!(events(&log, Topic::TransformException), vec!["transform-exception b"]);
    assert_eq!(events(&log, Topic::Skip), vec!["skip b"]);
}

#[test]
fn test_transform_listener_error_goes_through_exception_event() {
    let recorder = Rc::new(RefCell::new(Recorder::default()));
    let mut etl = pipeline(&recorder)
        .on_transform(|event| {
            if event.item() == Some(&"a") {
                return Err(EtlError::msg("listener refused a"));
            }
            Ok(())
        })
        .on_transform_exception(|event| {
            assert_eq!(event.error().map(ToString::to_string).as_deref(), Some("listener refused a"));
            event.ignore_exception();
            Ok(())
        })
        .build()
        .unwrap();

    etl.process(vec!["a", "b"]).unwrap();

    assert_eq!(recorder.borrow().loaded(), vec!["b"]);
}

#[test]
fn test_fatal_extract_listener_error_goes_through_exception_event() {
    let recorder = Rc::new(RefCell::new(Recorder::default()));
    let (tool, log) = observe(pipeline(&recorder).on_extract(|event| {
        if event.item() == Some(&"b") {
            return Err(EtlError::fatal("boom"));
        }
        Ok(())
    }));
    let mut etl = tool.build().unwrap();

    let err = etl.process(vec!["a", "b", "c"]).unwrap_err();

    assert_eq!(err.to_string(), "boom");
    assert_eq!(recorder.borrow().loaded(), vec!["a"]);
    assert_eq!(events(&log, Topic::Extract), vec!["extract a", "extract b"]);
    assert_eq!(events(&log, Topic::ExtractException), vec!["extract-exception b"]);
    assert!(events(&log, Topic::End).is_empty());
}

#[test]
fn test_ignored_fatal_extract_listener_error_ends_extraction() {
    let recorder = Rc::new(RefCell::new(Recorder::default()));
    let mut etl = pipeline(&recorder)
        .on_extract(|event| {
            if event.item() == Some(&"b") {
                return Err(EtlError::fatal("boom"));
            }
            Ok(())
        })
        .on_extract_exception(|event| {
            event.ignore_exception();
            Ok(())
        })
        .build()
        .unwrap();

    let summary = etl.process(vec!["a", "b", "c"]).unwrap();

    assert_eq!(summary.total, 1);
    assert_eq!(recorder.borrow().loaded(), vec!["a"]);
    assert_eq!(recorder.borrow().commits, vec![false]);
}

#[test]
fn test_fatal_transformer_error_bypasses_exception_event() {
    let recorder = Rc::new(RefCell::new(Recorder::default()));
    let tool = pipeline(&recorder)
        .transform_with(|item: &&'static str, key: &Key, _decision: &mut Decision| {
            if *item == "b" {
                return Err(EtlError::fatal("schema mismatch"));
            }
            Ok(Pairs::once(key.clone(), *item))
        })
        .loader(Rc::clone(&recorder))
        .on_transform_exception(|event| {
            event.ignore_exception();
            Ok(())
        });
    let (tool, log) = observe(tool);
    let mut etl = tool.build().unwrap();

    let err = etl.process(vec!["a", "b", "c"]).unwrap_err();

    assert_eq!(err.to_string(), "schema mismatch");
    assert_eq!(recorder.borrow().loaded(), vec!["a"]);
    assert!(events(&log, Topic::TransformException).is_empty());
    assert!(events(&log, Topic::End).is_empty());
}

#[test]
fn test_fatal_transform_listener_error_bypasses_exception_event() {
    let recorder = Rc::new(RefCell::new(Recorder::default()));
    let tool = pipeline(&recorder)
        .on_transform(|event| {
            if event.item() == Some(&"b") {
                return Err(EtlError::fatal("listener gave up"));
            }
            Ok(())
        })
        .on_transform_exception(|event| {
            event.ignore_exception();
            Ok(())
        });
    let (tool, log) = observe(tool);
    let mut etl = tool.build().unwrap();

    let err = etl.process(vec!["a", "b", "c"]).unwrap_err();

    assert_eq!(err.to_string(), "listener gave up");
    assert_eq!(recorder.borrow().loaded(), vec!["a"]);
    assert_eq!(events(&log, Topic::Transform), vec!["transform a", "transform b"]);
    assert!(events(&log, Topic::TransformException).is_empty());
}

#[test]
fn test_load_listener_error_takes_back_the_count() {
    let recorder = Rc::new(RefCell::new(Recorder::default()));
    let (tool, log) = observe(pipeline(&recorder).on_load(|event| {
        if event.item() == Some(&"b") {
            return Err(EtlError::msg("listener refused b"));
        }
        Ok(())
    }));
    let mut etl = tool.build().unwrap();

    let err = etl.process(vec!["a", "b", "c"]).unwrap_err();

    assert_eq!(err.to_string(), "listener refused b");
    // The sink itself accepted b before the listener failed.
    assert_eq!(recorder.borrow().loaded(), vec!["a", "b"]);
    assert_eq!(etl.counters(), Counters { since_flush: 1, total: 1 });
    assert_eq!(events(&log, Topic::Load), vec!["load a", "load b"]);
    assert_eq!(events(&log, Topic::LoadException), vec!["load-exception b"]);
    assert!(events(&log, Topic::End).is_empty());
}

#[test]
fn test_ignored_load_listener_error_is_not_counted() {
    let recorder = Rc::new(RefCell::new(Recorder::default()));
    let mut etl = pipeline(&recorder)
        .on_load(|event| {
            if event.item() == Some(&"b") {
                return Err(EtlError::msg("listener refused b"));
            }
            Ok(())
        })
        .on_load_exception(|event| {
            event.ignore_exception();
            Ok(())
        })
        .build()
        .unwrap();

    let summary = etl.process(vec!["a", "b", "c"]).unwrap();

    assert_eq!(summary.total, 2);
    assert_eq!(recorder.borrow().loaded(), vec!["a", "b", "c"]);
    assert_eq!(recorder.borrow().commits, vec![false]);
}

#[test]
fn test_trigger_flush_from_extractor() {
    let recorder = Rc::new(RefCell::new(Recorder::default()));
    let tool = EtlTool::extract_with(|input: Vec<&'static str>, decision: &mut Decision| {
        decision.trigger_flush();
        Ok(input)
    })
    .loader(Rc::clone(&recorder));
    let (tool, log) = observe(tool);
    let mut etl = tool.build().unwrap();

    etl.process(vec!["a", "b"]).unwrap();

    assert_eq!(recorder.borrow().commits, vec![true, false]);
    assert_eq!(events(&log, Topic::Flush), vec!["flush 1 partial", "flush 1"]);
}

#[test]
fn test_loader_init_runs_once_after_skips() {
    let recorder = Rc::new(RefCell::new(Recorder::default()));
    let tool = pipeline(&recorder).flush_count(1).on_extract(|event| {
        if event.item() == Some(&"a") {
            event.skip_current_item();
        }
        Ok(())
    });
    let (tool, log) = observe(tool);
    let mut etl = tool.build().unwrap();

    etl.process(vec!["a", "b", "c"]).unwrap();

    assert_eq!(recorder.borrow().inits, 1);
    assert_eq!(events(&log, Topic::LoaderInit), vec!["loader-init b"]);
}

#[test]
fn test_missing_commit_and_rollback_are_noops() {
    let loaded = Rc::new(RefCell::new(0));
    let sink = Rc::clone(&loaded);
    let tool = EtlTool::<Vec<&'static str>, &'static str>::new()
        .load_with(move |_pairs, _key, decision| {
            *sink.borrow_mut() += 1;
            decision.stop_process(true);
            Ok(())
        })
        .flush_count(1);
    let (tool, log) = observe(tool);
    let mut etl = tool.build().unwrap();

    let summary = etl.process(vec!["a", "b"]).unwrap();

    assert_eq!(*loaded.borrow(), 1);
    assert!(events(&log, Topic::Flush).is_empty());
    assert!(events(&log, Topic::Rollback).is_empty());
    // Without a rollback slot the pending count is still taken back.
    assert_eq!(summary, RunSummary { total: 0, rolled_back: true });
}

#[test]
fn test_zero_flush_count_is_coerced() {
    let recorder = Rc::new(RefCell::new(Recorder::default()));
    let mut etl: Etl<Vec<&'static str>, &'static str> = Etl::new(
        Box::new(PassThrough),
        Box::new(Identity),
        load::LoaderSlots::from_loader(Rc::clone(&recorder)),
        crate::hooks::Hooks::new(),
        Some(0),
    );

    assert_eq!(etl.flush_count(), Some(1));

    etl.process(vec!["a", "b"]).unwrap();
    assert_eq!(recorder.borrow().commits, vec![true, true, false]);
}
