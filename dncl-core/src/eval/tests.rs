use pretty_assertions::assert_eq;

use crate::{
    environment::prelude::{DnclObject, Environment},
    parser::prelude::{parse_program, BuiltInFunction, SystemCommand},
    utils::prelude::SrcSpan
};

use super::{
    stdlib::{StandardBuiltins, StdinCommands},
    EvalError, Evaluator, Origin
};

const CURRYING: &str = r#"関数 add(n) を:
    関数 f(x) を:
      もし x == "" ならば:
        戻り値(n)
      そうでなければ:
        戻り値( add(x + n) )
    と定義する
    戻り値(f)
と定義する
表示する(add(1)(2)(3)(4)(""))
"#;

const HISTOGRAM: &str = r#"Data = [3, 1, 4, 1, 5, 9, 2, 6]
Count = [0, 0, 0, 0]
i を 0 から 要素数(Data) - 1 まで 1 ずつ増やしながら繰り返す:
    bin = Data[i] ÷ 3
    Count[bin] を 1 増やす
表示する(Count)
"#;

fn run_with(src: &str, origin: Origin, input: &str) -> (Result<DnclObject, EvalError>, String) {
    let program = parse_program(src).unwrap();
    let mut out = Vec::new();

    let result = {
        let mut evaluator = Evaluator::new(
            StandardBuiltins::new(&mut out),
            StdinCommands::new(input.as_bytes()),
            origin
        );

        evaluator.eval_program(&program)
    };

    (result, String::from_utf8(out).unwrap())
}

fn run(src: &str) -> (DnclObject, String) {
    let (result, out) = run_with(src, Origin::One, "");

    (result.unwrap(), out)
}

fn int(value: i64) -> DnclObject {
    DnclObject::int(value, SrcSpan::default())
}

fn error_message(value: &DnclObject) -> &str {
    match value {
        DnclObject::Error { message, .. } => message,
        other => panic!("expected an error value, got {other}")
    }
}

#[test]
fn test_print_sum() {
    let (result, out) = run("表示する(1 + 2)");

    assert_eq!(out, "3\n");
    assert!(result.is_null());
}

#[test]
fn test_currying() {
    let (result, out) = run(CURRYING);

    assert_eq!(out, "10\n");
    assert!(result.is_null());
}

#[test]
fn test_length() {
    let (_, out) = run("表示する(要素数([1, 2, 3]))");
    assert_eq!(out, "3\n");

    let (result, out) = run("表示する(要素数(5))");
    assert_eq!(out, "");
    assert!(matches!(result, DnclObject::TypeError { .. }));
}

#[test]
fn test_diff() {
    let (_, out) = run("表示する(差分(\"c\"), 差分(\" \"))");

    assert_eq!(out, "2, -1\n");
}

#[test]
fn test_program_value() {
    assert_eq!(run("1 + 2").0, int(3));
    assert!(run("x = 1").0.is_null());
    assert!(run("").0.is_null());

    let (result, out) = run("5 を返す\n表示する(1)");
    assert_eq!(result, int(5));
    assert_eq!(out, "");
}

#[test]
fn test_origin() {
    let src = "a = [10, 20, 30]\n表示する(a[1])";

    let (_, out) = run_with(src, Origin::One, "");
    assert_eq!(out, "10\n");

    let (_, out) = run_with(src, Origin::Zero, "");
    assert_eq!(out, "20\n");

    let (result, _) = run("a = [10, 20, 30]\na[0]");
    assert_eq!(error_message(&result), "添字 0 は範囲外です (1 から 3 まで)");

    let (result, _) = run_with("a = [10, 20, 30]\na[3]", Origin::Zero, "");
    assert_eq!(error_message(&result.unwrap()), "添字 3 は範囲外です (0 から 2 まで)");
}

#[test]
fn test_origin_from_int() {
    assert_eq!(Origin::try_from(0), Ok(Origin::Zero));
    assert_eq!(Origin::try_from(1), Ok(Origin::One));
    assert_eq!(Origin::try_from(2), Err(EvalError::InvalidOrigin { origin: 2 }));
    assert_eq!(Origin::default(), Origin::One);
}

#[test]
fn test_histogram() {
    let (result, out) = run_with(HISTOGRAM, Origin::Zero, "");

    assert!(result.unwrap().is_null());
    assert_eq!(out, "[3, 3, 1, 1]\n");
}

#[test]
fn test_nested_arrays_are_shared() {
    let src = "a = [[1, 2], [3, 4]]\na[2][1] = 9\nb = a\nb[1][1] = 0\n表示する(a)";

    let (_, out) = run(src);

    assert_eq!(out, "[[0, 2], [9, 4]]\n");
}

#[test]
fn test_index_assignment_out_of_range() {
    let (result, _) = run("a = [1]\na[2] = 5");

    assert_eq!(error_message(&result), "添字 2 は範囲外です (1 から 1 まで)");
}

#[test]
fn test_closure_sees_later_assignment() {
    let src = "x = 1\n関数 get() を:\n    x を返す\nと定義する\nx = 2\n表示する(get())";

    let (_, out) = run(src);

    assert_eq!(out, "2\n");
}

#[test]
fn test_block_scope() {
    let (result, out) = run("x = 0\nもし 1 == 1 ならば:\n    x = 1\n    y = 5\n表示する(x)\n表示する(y)");

    assert_eq!(out, "1\n");
    assert_eq!(error_message(&result), "`y` は定義されていません");
}

#[test]
fn test_conditional_chain() {
    let src = r#"関数 sign(x) を:
    もし x < 0 ならば:
        -1 を返す
    そうでなくもし x == 0 ならば:
        0 を返す
    そうでなければ:
        1 を返す
と定義する
表示する(sign(-5), sign(0), sign(7))"#;

    let (_, out) = run(src);

    assert_eq!(out, "-1, 0, 1\n");
}

#[test]
fn test_while_loop() {
    let (_, out) = run("x = 0\nx < 5 の間繰り返す:\n    x を 1 増やす\n表示する(x)");

    assert_eq!(out, "5\n");
}

#[test]
fn test_do_until_runs_at_least_once() {
    let (_, out) = run("x = 0\n繰り返し:\n    x を 2 増やす\nを, x >= 5 になるまで実行する\n表示する(x)");
    assert_eq!(out, "6\n");

    let (_, out) = run("x = 10\n繰り返し: x を 1 減らす を x < 100 になるまで実行する\n表示する(x)");
    assert_eq!(out, "9\n");
}

#[test]
fn test_counted_loops() {
    let (_, out) = run("i を 10 から 1 まで 3 ずつ減らしながら繰り返す:\n    表示する(i)");
    assert_eq!(out, "10\n7\n4\n1\n");

    let (_, out) = run("合計 = 0\ni を 1 から 3 まで 1 ずつ増やしながら繰り返す:\n    合計 を i 増やす\n表示する(合計, i)");
    assert_eq!(out, "6, 4\n");

    let (_, out) = run("i を 5 から 1 まで 1 ずつ増やしながら繰り返す:\n    表示する(i)");
    assert_eq!(out, "");
}

#[test]
fn test_counted_loop_rejects_non_positive_step() {
    let (result, out) = run("i を 1 から 3 まで 0 ずつ増やしながら繰り返す:\n    表示する(i)");

    assert_eq!(out, "");
    assert_eq!(error_message(&result), "増分は正の整数でなければなりません");
}

#[test]
fn test_return_from_loop() {
    let src = r#"関数 find(a, x) を:
    i を 1 から 要素数(a) まで 1 ずつ増やしながら繰り返す:
        もし a[i] == x ならば:
            i を返す
    -1 を返す
と定義する
表示する(find([5, 6, 7], 7), find([5], 9))"#;

    let (_, out) = run(src);

    assert_eq!(out, "3, -1\n");
}

#[test]
fn test_function_without_return_yields_null() {
    let (_, out) = run("関数 f() を:\n    x = 1\nと定義する\n表示する(f())");

    assert_eq!(out, "null\n");
}

#[test]
fn test_errors_stop_the_program() {
    let (result, out) = run("表示する(1)\n表示する(z)\n表示する(2)");

    assert_eq!(out, "1\n");
    assert_eq!(error_message(&result), "`z` は定義されていません");
    assert_eq!(result.location(), SrcSpan::from(29, 30));
}

#[test]
fn test_error_values() {
    let (result, _) = run("x = 1 ÷ 0");
    assert_eq!(error_message(&result), "0 で割ることはできません");

    let (result, _) = run("関数 f(a) を:\n    a を返す\nと定義する\nf(1, 2)");
    assert_eq!(error_message(&result), "引数の数が違います: 1 個必要ですが 2 個渡されました");

    let (result, _) = run("x = 9223372036854775807 + 1");
    assert_eq!(error_message(&result), "計算結果が整数の範囲を超えました");

    let (result, _) = run("もし 1 ならば:\n    表示する(1)");
    assert!(matches!(result, DnclObject::TypeError { .. }));

    let (result, _) = run("x = 1\nx(2)");
    assert!(matches!(result, DnclObject::TypeError { .. }));
}

#[test]
fn test_error_inside_function_passes_through() {
    let (result, out) = run("関数 f() を:\n    表示する(1)\n    1 ÷ 0\n    表示する(2)\nと定義する\nf()\n表示する(3)");

    assert_eq!(out, "1\n");
    assert_eq!(error_message(&result), "0 で割ることはできません");
}

#[test]
fn test_max_call_depth() {
    let program = parse_program("関数 f(n) を:\n    f(n + 1) を返す\nと定義する\nf(0)").unwrap();

    let mut evaluator = Evaluator::new(
        StandardBuiltins::new(std::io::sink()),
        StdinCommands::new(std::io::empty()),
        Origin::One
    ).with_max_call_depth(50);

    let result = evaluator.eval_program(&program).unwrap();

    assert_eq!(error_message(&result), "関数の呼び出しが深すぎます (上限 50)");
}

#[test]
fn test_short_circuit() {
    let (_, out) = run("x = 1 == 2 かつ 未定義 == 1\ny = 1 == 1 または 1 ÷ 0 == 0\n表示する(x, y)");

    assert_eq!(out, "false, true\n");
}

#[test]
fn test_string_operators() {
    let (_, out) = run("表示する(\"a\" + 1 + \"b\", 2 + \"c\", 「あ」 < 「い」, \"x\" == 1)");

    assert_eq!(out, "a1b, 2c, true, false\n");
}

#[test]
fn test_input_command() {
    let src = "x = 【外部からの入力】\ny = 【外部からの入力】\n表示する(x + 1, y)";

    let (result, out) = run_with(src, Origin::One, "41\nhello\n");

    assert!(result.unwrap().is_null());
    assert_eq!(out, "42, hello\n");

    let (result, _) = run_with("x = 【外部からの入力】", Origin::One, "");
    assert_eq!(error_message(&result.unwrap()), "入力がありません");
}

#[test]
fn test_unknown_command_is_null() {
    let (_, out) = run("x = 【画面を消す】\n表示する(x)");

    assert_eq!(out, "null\n");
}

#[test]
fn test_custom_handlers() {
    let program = parse_program("表示する(【何か】, 2)\n表示する(3)").unwrap();

    let mut printed = vec![];
    let mut commands = vec![];

    {
        let builtins = |function: BuiltInFunction, arguments: Vec<DnclObject>, location: SrcSpan| {
            assert_eq!(function, BuiltInFunction::Print);
            printed.push(arguments);
            DnclObject::null(location)
        };

        let system = |command: &SystemCommand| {
            commands.push(command.to_string());
            DnclObject::int(1, command.location())
        };

        let mut evaluator = Evaluator::new(builtins, system, Origin::One);
        evaluator.eval_program(&program).unwrap();
    }

    assert_eq!(printed, vec![vec![int(1), int(2)], vec![int(3)]]);
    assert_eq!(commands.len(), 1);
}

#[test]
fn test_builtin_return_value_is_fatal() {
    let program = parse_program("表示する(1)").unwrap();

    let builtins = |_: BuiltInFunction, mut arguments: Vec<DnclObject>, location: SrcSpan| {
        DnclObject::return_value(arguments.remove(0), location)
    };

    let mut evaluator = Evaluator::new(builtins, |command: &SystemCommand| DnclObject::null(command.location()), Origin::One);

    let result = evaluator.eval_program(&program);

    assert!(matches!(
        result,
        Err(EvalError::UnexpectedReturnValue { function: BuiltInFunction::Print, .. })
    ));
}

#[test]
fn test_shared_environment_between_programs() {
    let definitions = parse_program("関数 double(x) を:\n    x * 2 を返す\nと定義する\nbase = 20").unwrap();
    let program = parse_program("表示する(double(base) + 2)").unwrap();

    let env = Environment::new_shared();
    let mut out = Vec::new();

    {
        let mut evaluator = Evaluator::new(
            StandardBuiltins::new(&mut out),
            StdinCommands::new(std::io::empty()),
            Origin::One
        );

        evaluator.eval_program_in(&definitions, env.clone()).unwrap();
        evaluator.eval_program_in(&program, env.clone()).unwrap();
    }

    assert_eq!(String::from_utf8(out).unwrap(), "42\n");
    assert!(env.borrow().is_defined("double"));
}

#[test]
fn test_print_separator() {
    let program = parse_program("表示する(1, \"a\", [2, 3])").unwrap();
    let mut out = Vec::new();

    {
        let builtins = StandardBuiltins::new(&mut out).with_separator(" ");
        let mut evaluator = Evaluator::new(builtins, StdinCommands::new(std::io::empty()), Origin::One);

        evaluator.eval_program(&program).unwrap();
    }

    assert_eq!(String::from_utf8(out).unwrap(), "1 a [2, 3]\n");
}

#[test]
fn test_letter_histogram() {
    let src = format!(
        "Data = [\"b\", \"c\", \"b\", \" \", \"c\", \"z\", \"b\", \"c\"]\nCount = [{}]\n{}",
        vec!["0"; 26].join(", "),
        "i を 0 から 要素数(Data) - 1 まで 1 ずつ増やしながら繰り返す:\n    もし Data[i] != \" \" ならば:\n        Count[差分(Data[i])] を 1 増やす\n表示する(Count)"
    );

    let (result, out) = run_with(&src, Origin::Zero, "");

    let mut expected = vec![0; 26];
    expected[1] = 3;
    expected[2] = 3;
    expected[25] = 1;

    let expected = expected.iter()
        .map(|count| count.to_string())
        .collect::<Vec<String>>()
        .join(", ");

    assert!(result.unwrap().is_null());
    assert_eq!(out, format!("[{expected}]\n"));
}

#[test]
fn test_diff_requires_one_character() {
    let (result, _) = run("差分(\"ab\")");
    assert_eq!(error_message(&result), "`差分` には 1 文字の文字列を渡してください (\"ab\")");

    let (result, _) = run("差分(\"\")");
    assert_eq!(error_message(&result), "`差分` には 1 文字の文字列を渡してください (\"\")");
}

#[test]
fn test_array_cannot_contain_itself() {
    let (result, out) = run("a = [1]\na[1] = a\n表示する(a)");
    assert_eq!(out, "");
    assert_eq!(error_message(&result), "配列をその配列自身の中に入れることはできません");

    let (result, _) = run("a = [1]\nb = [[a]]\na[1] = b");
    assert_eq!(error_message(&result), "配列をその配列自身の中に入れることはできません");

    let (result, out) = run("a = [1]\nb = [2]\na[1] = b\nb[1] = 3\n表示する(a, b)");
    assert!(result.is_null());
    assert_eq!(out, "[[3]], [3]\n");
}
