// ABOUTME: End-to-end tests driving the full lex -> parse -> resolve -> interpret pipeline

use lox::error::LoxError;
use lox::interpreter::Interpreter;
use std::cell::RefCell;
use std::rc::Rc;

fn run(source: &str) -> Result<String, LoxError> {
    let buffer: Rc<RefCell<Vec<u8>>> = Rc::new(RefCell::new(Vec::new()));
    let mut interpreter = Interpreter::with_output(Rc::clone(&buffer) as Rc<RefCell<dyn std::io::Write>>);
    lox::run(source, &mut interpreter)?;
    Ok(String::from_utf8(buffer.borrow().clone()).unwrap())
}

#[test]
fn closures_capture_state_across_calls() {
    let out = run(
        r#"
        fun make_counter() {
            var count = 0;
            fun increment() {
                count = count + 1;
                return count;
            }
            return increment;
        }
        var counter = make_counter();
        print counter();
        print counter();
        print counter();
        "#,
    )
    .unwrap();
    assert_eq!(out, "1\n2\n3\n");
}

#[test]
fn inheritance_dispatches_through_super() {
    let out = run(
        r#"
        class A {
            speak() { print "A"; }
        }
        class B < A {
            speak() {
                super.speak();
                print "B";
            }
        }
        B().speak();
        "#,
    )
    .unwrap();
    assert_eq!(out, "A\nB\n");
}

#[test]
fn initializer_return_this_regardless_of_value_passed_to_return() {
    let out = run(
        r#"
        class Box {
            init(value) {
                this.value = value;
                return;
            }
        }
        var b = Box(7);
        print b.value;
        "#,
    )
    .unwrap();
    assert_eq!(out, "7\n");
}

#[test]
fn for_loop_continue_still_runs_the_increment() {
    let out = run(
        r#"
        for (var i = 0; i < 4; i = i + 1) {
            if (i == 2) continue;
            print i;
        }
        "#,
    )
    .unwrap();
    assert_eq!(out, "0\n1\n3\n");
}

#[test]
fn thrown_values_are_caught_and_finally_always_runs() {
    let out = run(
        r#"
        try {
            throw "oops";
        } except (e) {
            print e;
        } finally {
            print "done";
        }
        "#,
    )
    .unwrap();
    assert_eq!(out, "oops\ndone\n");
}

#[test]
fn uncaught_throw_is_reported_as_a_runtime_error_not_lost() {
    let err = run(r#"throw "boom";"#).unwrap_err();
    match err {
        LoxError::Runtime(lox::error::RuntimeError::UncaughtException { value, line, .. }) => {
            assert_eq!(value.to_string(), "boom");
            assert_eq!(line, 1);
        }
        other => panic!("expected an UncaughtException runtime error, got {other:?}"),
    }
}

#[test]
fn memoized_fibonacci_via_dict_and_closure() {
    let out = run(
        r#"
        fun make_fib() {
            var cache = hash();
            fun fib(n) {
                if (n < 2) return n;
                var key = str(n);
                var cached = cache.get(key);
                if (cached != nil) return cached;
                var result = fib(n - 1) + fib(n - 2);
                cache.set(key, result);
                return result;
            }
            return fib;
        }
        var fib = make_fib();
        print fib(20);
        "#,
    )
    .unwrap();
    assert_eq!(out, "6765\n");
}

#[test]
fn dividing_by_zero_is_a_runtime_error() {
    let err = run("print 1 / 0;").unwrap_err();
    assert!(matches!(err, LoxError::Runtime(_)));
}

#[test]
fn adding_mismatched_types_is_a_runtime_error() {
    let err = run(r#"print 1 + "a";"#).unwrap_err();
    assert!(matches!(err, LoxError::Runtime(_)));
}

#[test]
fn calling_a_non_callable_value_is_a_runtime_error() {
    let err = run("var x = 1; x();").unwrap_err();
    assert!(matches!(err, LoxError::Runtime(_)));
}

#[test]
fn wrong_arity_is_a_runtime_error() {
    let err = run("fun f(a, b) { return a + b; } f(1);").unwrap_err();
    assert!(matches!(err, LoxError::Runtime(_)));
}

#[test]
fn undefined_variable_is_a_runtime_error() {
    let err = run("print undefined_thing;").unwrap_err();
    assert!(matches!(err, LoxError::Runtime(_)));
}

#[test]
fn self_inheritance_is_a_resolve_error() {
    let err = run("class A < A {}").unwrap_err();
    assert!(matches!(err, LoxError::Resolve(_)));
}

#[test]
fn unterminated_string_is_a_lex_error() {
    let err = run("print \"oops;").unwrap_err();
    assert!(matches!(err, LoxError::Lex(_)));
}

#[test]
fn invalid_assignment_target_is_a_parse_error() {
    let err = run("1 + 1 = 2;").unwrap_err();
    assert!(matches!(err, LoxError::Parse(_)));
}

#[test]
fn lists_and_dicts_support_their_host_methods() {
    let out = run(
        r#"
        var list = array(1, 2, 3);
        list.append(4);
        print list.len();
        print list.get(3);

        var dict = hash();
        dict.set("a", 1);
        print dict.has("a");
        print dict.get("missing");
        "#,
    )
    .unwrap();
    assert_eq!(out, "4\n4\ntrue\nnil\n");
}

#[test]
fn logical_operators_short_circuit_and_return_operand_values() {
    let out = run(
        r#"
        print nil or "default";
        print "truthy" and "second";
        print false and "unreached";
        "#,
    )
    .unwrap();
    assert_eq!(out, "default\nsecond\nfalse\n");
}

#[test]
fn programs_accumulate_across_repeated_runs_on_one_interpreter() {
    let buffer: Rc<RefCell<Vec<u8>>> = Rc::new(RefCell::new(Vec::new()));
    let mut interpreter = Interpreter::with_output(Rc::clone(&buffer) as Rc<RefCell<dyn std::io::Write>>);

    lox::run("var x = 1;", &mut interpreter).unwrap();
    lox::run("x = x + 1;", &mut interpreter).unwrap();
    lox::run("print x;", &mut interpreter).unwrap();

    assert_eq!(String::from_utf8(buffer.borrow().clone()).unwrap(), "2\n");
}
