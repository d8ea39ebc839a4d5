use ledgerbook_server::budgets::{compute_budget_report, split_category_key};
use ledgerbook_server::models::{Budget, Expense};

fn budget(id: &str, composite: &str, kind: &str, amount: f64) -> Budget {
    let (category_name, category_ref) = split_category_key(composite);
    Budget {
        id: id.to_string(),
        id_operation: "op-1".to_string(),
        id_category: composite.to_string(),
        category_name,
        category_ref,
        kind: kind.to_string(),
        amount,
    }
}

fn expense(name: &str, category_name: &str, amount: f64) -> Expense {
    Expense {
        id: format!("exp-{}", name),
        id_operation: "op-1".to_string(),
        category_name: category_name.to_string(),
        category_icon: "wallet".to_string(),
        name: name.to_string(),
        kind: "EGRESOS FIJOS".to_string(),
        amount,
        date_amount: "2024-03-01T00:00:00Z".to_string(),
        created: "2024-03-01T00:00:00Z".to_string(),
        updated: "2024-03-01T00:00:00Z".to_string(),
    }
}

#[test]
fn split_key_with_delimiter() {
    assert_eq!(
        split_category_key("Servicios|64087f1b"),
        ("Servicios".to_string(), "64087f1b".to_string())
    );
}

#[test]
fn split_key_without_delimiter() {
    assert_eq!(
        split_category_key("Servicios"),
        ("Servicios".to_string(), String::new())
    );
}

#[test]
fn split_key_keeps_extra_delimiters_in_ref() {
    assert_eq!(
        split_category_key("Casa|abc|def"),
        ("Casa".to_string(), "abc|def".to_string())
    );
}

#[test]
fn split_key_empty_input() {
    assert_eq!(split_category_key(""), (String::new(), String::new()));
    assert_eq!(split_category_key("|ref"), (String::new(), "ref".to_string()));
}

#[test]
fn report_sums_expenses_by_category_name() {
    let budgets = vec![budget("b1", "Servicios|64087f1b", "EGRESOS FIJOS", 40000.0)];
    let expenses = vec![
        expense("Luz", "Servicios", 27800.0),
        expense("Agua", "Servicios", 5000.0),
        expense("Cine", "Entretenimiento", 12000.0),
    ];

    let report = compute_budget_report(&budgets, &expenses);

    assert_eq!(report.len(), 1);
    assert_eq!(report[0].name, "Servicios");
    assert_eq!(report[0].budget_amount, 40000.0);
    assert_eq!(report[0].kind, "EGRESOS FIJOS");
    assert_eq!(report[0].amount, 32800.0);
    assert!(!report[0].exceeded);
}

#[test]
fn report_overspend_flags_line() {
    let budgets = vec![budget("b1", "Servicios|64087f1b", "EGRESOS FIJOS", 40000.0)];
    let expenses = vec![
        expense("Luz", "Servicios", 27800.0),
        expense("Agua", "Servicios", 15000.0),
    ];

    let report = compute_budget_report(&budgets, &expenses);

    assert_eq!(report[0].amount, 42800.0);
    assert!(report[0].exceeded);
}

#[test]
fn report_exact_spend_is_not_exceeded() {
    let budgets = vec![budget("b1", "Comida|x", "EGRESOS VARIABLES", 100.0)];
    let expenses = vec![
        expense("Almuerzo", "Comida", 60.0),
        expense("Cena", "Comida", 40.0),
    ];

    let report = compute_budget_report(&budgets, &expenses);

    assert_eq!(report[0].amount, 100.0);
    assert!(!report[0].exceeded);
}

#[test]
fn report_unmatched_budget_keeps_zero_total() {
    let budgets = vec![budget("b1", "Ahorro|y", "AHORRO", 5000.0)];
    let expenses = vec![expense("Luz", "Servicios", 27800.0)];

    let report = compute_budget_report(&budgets, &expenses);

    assert_eq!(report.len(), 1);
    assert_eq!(report[0].name, "Ahorro");
    assert_eq!(report[0].amount, 0.0);
    assert!(!report[0].exceeded);
}

#[test]
fn report_empty_budgets_yield_empty_report() {
    let report = compute_budget_report(&[], &[expense("Luz", "Servicios", 27800.0)]);
    assert!(report.is_empty());

    let report = compute_budget_report(&[], &[]);
    assert!(report.is_empty());
}

#[test]
fn report_sorts_ascending_by_type() {
    let budgets = vec![
        budget("b1", "Viajes|a", "EGRESOS VARIABLES", 1000.0),
        budget("b2", "Ahorro|b", "AHORRO", 2000.0),
        budget("b3", "Servicios|c", "EGRESOS FIJOS", 3000.0),
    ];

    let report = compute_budget_report(&budgets, &[]);

    let kinds: Vec<&str> = report.iter().map(|line| line.kind.as_str()).collect();
    assert_eq!(kinds, vec!["AHORRO", "EGRESOS FIJOS", "EGRESOS VARIABLES"]);
}

#[test]
fn report_keeps_input_order_for_equal_types() {
    let budgets = vec![
        budget("b1", "Servicios|a", "EGRESOS FIJOS", 1000.0),
        budget("b2", "Alquiler|b", "EGRESOS FIJOS", 2000.0),
        budget("b3", "Internet|c", "EGRESOS FIJOS", 3000.0),
    ];

    let report = compute_budget_report(&budgets, &[]);

    let names: Vec<&str> = report.iter().map(|line| line.name.as_str()).collect();
    assert_eq!(names, vec!["Servicios", "Alquiler", "Internet"]);
}

#[test]
fn report_duplicate_category_budgets_each_get_full_total() {
    let budgets = vec![
        budget("b1", "Comida|a", "EGRESOS VARIABLES", 500.0),
        budget("b2", "Comida|b", "EGRESOS FIJOS", 2000.0),
    ];
    let expenses = vec![expense("Almuerzo", "Comida", 1000.0)];

    let report = compute_budget_report(&budgets, &expenses);

    assert_eq!(report.len(), 2);
    assert_eq!(report[0].kind, "EGRESOS FIJOS");
    assert_eq!(report[0].amount, 1000.0);
    assert!(!report[0].exceeded);
    assert_eq!(report[1].kind, "EGRESOS VARIABLES");
    assert_eq!(report[1].amount, 1000.0);
    assert!(report[1].exceeded);
}

#[test]
fn report_category_match_is_exact() {
    let budgets = vec![budget("b1", "Casa|a", "EGRESOS FIJOS", 100.0)];
    let expenses = vec![
        expense("Arriendo", "casa", 500.0),
        expense("Mercado", "Casa ", 500.0),
    ];

    let report = compute_budget_report(&budgets, &expenses);

    assert_eq!(report[0].amount, 0.0);
    assert!(!report[0].exceeded);
}

#[test]
fn report_line_name_comes_from_split_category_name() {
    let budgets = vec![budget("b1", "Transporte|9f2c", "EGRESOS VARIABLES", 800.0)];

    let report = compute_budget_report(&budgets, &[]);

    assert_eq!(report[0].name, "Transporte");
}
