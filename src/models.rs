use serde::{Deserialize, Serialize};

/// Wire names follow the original API: the login handle is `user`, the
/// classification field is `type`, and the expense join key is
/// `nameCategory`.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct User {
    pub id: String,
    #[serde(rename = "user")]
    pub login: String,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created: String,
}

#[derive(Deserialize)]
pub struct CreateUserPayload {
    #[serde(rename = "user")]
    pub login: String,
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct UpdateUserPayload {
    #[serde(rename = "user")]
    pub login: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginPayload {
    pub user: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub user: User,
    pub token: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    pub id: String,
    pub name: String,
    pub id_user: String,
    pub created: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOperationPayload {
    pub name: String,
    pub id_user: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOperationPayload {
    pub name: Option<String>,
    pub id_user: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Category {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub created: String,
    pub updated: String,
}

#[derive(Deserialize)]
pub struct CreateCategoryPayload {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub icon: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateCategoryPayload {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    pub id: String,
    pub id_operation: String,
    pub name: String,
    pub amount: f64,
    pub created: String,
    pub updated: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEntryPayload {
    pub id_operation: String,
    pub name: String,
    pub amount: f64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEntryPayload {
    pub id_operation: Option<String>,
    pub name: Option<String>,
    pub amount: Option<f64>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: String,
    pub id_operation: String,
    #[serde(rename = "nameCategory")]
    pub category_name: String,
    #[serde(rename = "iconCategory")]
    pub category_icon: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub amount: f64,
    pub date_amount: String,
    pub created: String,
    pub updated: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateExpensePayload {
    pub id_operation: String,
    #[serde(rename = "nameCategory")]
    pub category_name: String,
    #[serde(rename = "iconCategory")]
    pub category_icon: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub amount: f64,
    pub date_amount: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateExpensePayload {
    pub id_operation: Option<String>,
    #[serde(rename = "nameCategory")]
    pub category_name: Option<String>,
    #[serde(rename = "iconCategory")]
    pub category_icon: Option<String>,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub amount: Option<f64>,
    pub date_amount: Option<String>,
}

/// `id_category` keeps the legacy `"<name>|<suffix>"` composite for
/// round-tripping; `category_name`/`category_ref` are the typed halves,
/// split once when the row is written.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    pub id: String,
    pub id_operation: String,
    pub id_category: String,
    pub category_name: String,
    pub category_ref: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub amount: f64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBudgetPayload {
    pub id_operation: String,
    pub id_category: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub amount: f64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBudgetPayload {
    pub id_operation: Option<String>,
    pub id_category: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub amount: Option<f64>,
}

/// One line of the budget-vs-expense report.
#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct BudgetReportLine {
    pub name: String,
    pub budget_amount: f64,
    #[serde(rename = "type")]
    pub kind: String,
    pub amount: f64,
    pub exceeded: bool,
}
