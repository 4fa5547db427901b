mod common;

use common::*;
use twinparse::{
    ConflictKind, ConstructionError, EarleyParser, Grammar, LrConfig, LrParser, LrTable,
    ParseOutcome, Rejection, Symbol,
};

/// Both engines must agree on every input, and produce the same tree.
fn check_against_earley(grammar: &Grammar, k: usize, max_len: usize) {
    init();

    let table = LrTable::build(grammar, &LrConfig::new(k)).expect("cannot build table");
    let lr = LrParser::new(&table);
    let earley = EarleyParser::new(grammar);

    for input in all_inputs(grammar, max_len) {
        let tree = lr.parse(&input).accepted();
        let forest = earley.parse(&input).accepted();

        match (tree, forest) {
            (Some(tree), Some(forest)) => {
                let single = forest.single_tree().expect("the grammar is unambiguous");
                assert_eq!(tree.flatten_to_string(), single.flatten_to_string());
            }
            (None, None) => {}
            (tree, forest) => panic!(
                "engines disagree on {:?}: lr={:?}, earley={:?}",
                render(&input),
                tree.is_some(),
                forest.is_some()
            ),
        }
    }
}

#[test]
fn test_001_engines_agree() {
    check_against_earley(&anbn_grammar(), 1, 6);
    check_against_earley(&seminar_grammar(), 1, 6);
    check_against_earley(&expr_grammar(), 1, 4);
    check_against_earley(&expr_grammar(), 2, 4);
    check_against_earley(&lr2_grammar(), 2, 5);
    check_against_earley(&nullable_start_grammar(), 1, 4);
    check_against_earley(&non_nullable_start_grammar(), 1, 4);
}

#[test]
fn test_002_recognizes_exactly_the_language() {
    init();

    let g = seminar_grammar();
    let table = LrTable::build(&g, &LrConfig::default()).unwrap();
    let parser = LrParser::new(&table);
    let language = language(&g, 6);

    for input in all_inputs(&g, 6) {
        assert_eq!(
            parser.recognize(&input),
            language.contains(&input),
            "{:?}",
            render(&input)
        );
    }
}

#[test]
fn test_003_dangling_else() {
    init();

    let g = dangling_else_grammar();
    let err = LrTable::build(&g, &LrConfig::default()).expect_err("the grammar is ambiguous");
    let conflict = err.conflict().expect("expecting a conflict");

    assert_eq!(conflict.kind, ConflictKind::ShiftReduce);
    assert_eq!(conflict.lookahead, vec![Symbol::term("else")]);

    // The Earley parser still finds both readings.
    let forest = EarleyParser::new(&g)
        .parse(&tokens("if cond then if cond then other else other"))
        .accepted()
        .unwrap();
    assert_eq!(forest.count_trees(), 2);
}

#[test]
fn test_004_construction_errors_are_not_rejections() {
    init();

    let g = anbn_grammar();

    let err: ConstructionError = LrTable::build(&g, &LrConfig::new(0)).unwrap_err();
    assert!(matches!(err, ConstructionError::UnsupportedLookahead(0)));

    let table = LrTable::build(&g, &LrConfig::default()).unwrap();
    let outcome = LrParser::new(&table).parse(&tokens("a a b"));
    let rejection: &Rejection = outcome.rejection().expect("a a b is not in the language");
    assert_eq!(rejection.position(), 3);
}

#[test]
fn test_005_anbn() {
    init();

    let g = anbn_grammar();
    let table = LrTable::build(&g, &LrConfig::default()).unwrap();
    let parser = LrParser::new(&table);

    assert!(parser.recognize(&tokens("a a b b")));
    assert!(!parser.recognize(&tokens("a a b")));
    assert!(parser.recognize(&tokens("")));
}

#[test]
fn test_006_empty_input() {
    init();

    let g = non_nullable_start_grammar();
    let table = LrTable::build(&g, &LrConfig::default()).unwrap();

    match LrParser::new(&table).parse(&[]) {
        ParseOutcome::Rejected(Rejection::UnexpectedToken {
            position,
            found,
            expected,
        }) => {
            assert_eq!(position, 0);
            assert_eq!(found, None);
            assert_eq!(expected.to_string(), "a");
        }
        outcome => panic!("unexpected outcome {:?}", outcome),
    }
}

#[test]
fn test_007_shared_table() {
    init();

    let g = expr_grammar();
    let table = LrTable::build(&g, &LrConfig::default()).unwrap();
    let inputs = ["id + id", "( id ) * id", "id +", "( ( id ) )"];

    let outcomes: Vec<bool> = std::thread::scope(|scope| {
        let handles: Vec<_> = inputs
            .iter()
            .map(|input| {
                let parser = LrParser::new(&table);
                scope.spawn(move || parser.recognize(&tokens(input)))
            })
            .collect();

        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(outcomes, vec![true, true, false, true]);
}

#[test]
fn test_008_long_inputs() {
    init();

    let n = 10_000;
    let input = repeated("a", n);

    let g = nullable_start_grammar();
    let table = LrTable::build(&g, &LrConfig::default()).unwrap();
    let tree = LrParser::new(&table)
        .parse(&input)
        .accepted()
        .expect("a^n is in the language");

    assert_eq!(tree.leaves().len(), n);
    assert_eq!(
        tree.flatten_to_string(),
        format!("{}(S){}", "(S a ".repeat(n), ")".repeat(n))
    );

    let g = left_recursive_grammar();
    let table = LrTable::build(&g, &LrConfig::default()).unwrap();
    let tree = LrParser::new(&table)
        .parse(&input)
        .accepted()
        .expect("a^n is in the language");

    let earley = EarleyParser::new(&g)
        .parse(&input)
        .accepted()
        .and_then(|forest| forest.single_tree())
        .expect("a^n is in the language");

    assert_eq!(tree.flatten_to_string(), earley.flatten_to_string());
    assert_eq!(
        tree.flatten_to_string(),
        format!("{}(S){}", "(S ".repeat(n), " a)".repeat(n))
    );
}
