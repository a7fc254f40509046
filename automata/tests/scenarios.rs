use automata::{LoadError, Pda, Verdict, simulate};
use pretty_assertions::assert_eq;

const ANBN: &str = r#"{
    "estados": ["q0", "q1"],
    "alfabeto_entrada": ["a", "b"],
    "alfabeto_pilha": ["Z"],
    "estado_inicial": "q0",
    "estados_finais": ["q1"],
    "transicoes": [
        {"estado_origem": "q0", "leitura": "a", "topo_pilha": "",  "substituir_topo": "Z", "estado_destino": "q0"},
        {"estado_origem": "q0", "leitura": "b", "topo_pilha": "Z", "substituir_topo": "",  "estado_destino": "q1"},
        {"estado_origem": "q1", "leitura": "b", "topo_pilha": "Z", "substituir_topo": "",  "estado_destino": "q1"}
    ]
}"#;

fn verdicts(pda: &Pda, input: &str, budget: usize) -> Vec<Verdict> {
    simulate(pda, input, budget)
        .unwrap()
        .outcomes
        .iter()
        .map(|o| o.verdict())
        .collect()
}

#[test]
fn balanced_input_has_one_accepting_path() {
    let (pda, logs) = Pda::from_json(ANBN).unwrap();
    assert!(logs.entries().is_empty());

    let report = simulate(&pda, "aabb", 100).unwrap();
    assert_eq!(report.outcomes.len(), 1);
    let path = report.accepted().next().unwrap();
    assert_eq!(pda.state_name(path.state), "q1");
    assert!(path.stack.is_empty());
}

#[test]
fn only_input_and_state_decide_acceptance() {
    let (pda, _) = Pda::from_json(ANBN).unwrap();
    assert_eq!(verdicts(&pda, "abab", 100), vec![Verdict::Rejected]);
    assert_eq!(verdicts(&pda, "aaab", 100), vec![Verdict::Accepted]);
}

#[test]
fn epsilon_self_loop_is_bounded() {
    let (pda, _) = Pda::from_json(
        r#"{
            "estados": ["q0"],
            "alfabeto_entrada": ["a"],
            "alfabeto_pilha": ["Z"],
            "estado_inicial": "q0",
            "estados_finais": ["q0"],
            "transicoes": [
                {"estado_origem": "q0", "leitura": "", "topo_pilha": "", "substituir_topo": "Z", "estado_destino": "q0"}
            ]
        }"#,
    )
    .unwrap();
    assert_eq!(verdicts(&pda, "", 10), vec![Verdict::StepLimitExceeded]);
}

#[test]
fn accepting_start_on_empty_input() {
    let (pda, _) = Pda::from_json(
        r#"{
            "estados": ["q0"],
            "alfabeto_entrada": ["a"],
            "alfabeto_pilha": ["Z"],
            "estado_inicial": "q0",
            "estados_finais": ["q0"],
            "transicoes": []
        }"#,
    )
    .unwrap();
    let report = simulate(&pda, "", 10).unwrap();
    assert_eq!(report.outcomes.len(), 1);
    assert_eq!(report.outcomes[0].verdict(), Verdict::Accepted);
    assert!(report.outcomes[0].path().steps.is_empty());
}

#[test]
fn unknown_read_symbol_fails_to_load() {
    let err = Pda::from_json(&ANBN.replace(r#""leitura": "b", "topo_pilha": "Z", "substituir_topo": "",  "estado_destino": "q1"}"#, r#""leitura": "x", "topo_pilha": "Z", "substituir_topo": "",  "estado_destino": "q1"}"#))
        .unwrap_err();
    let LoadError::Invalid(logs) = err else {
        panic!("expected validation errors");
    };
    let fields: Vec<_> = logs.errors().filter_map(|e| e.field()).collect();
    assert_eq!(fields, vec!["transicoes[1].leitura", "transicoes[2].leitura"]);
}
