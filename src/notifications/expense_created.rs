use crate::expenses::format::format_value;
use crate::expenses::repo_types::ExpenseWithOwner;
use crate::notifications::mailer::{Address, MailMessage};

pub const SUBJECT: &str = "Despesa cadastrada!";

/// Link to the expense resource, as exposed by the API.
pub fn expense_url(app_url: &str, row: &ExpenseWithOwner) -> String {
    format!("{}/api/expenses/{}", app_url.trim_end_matches('/'), row.expense.id)
}

/// Mail sent to the owner after an expense is stored.
pub fn render(row: &ExpenseWithOwner, from: Address, app_url: &str) -> MailMessage {
    let value = format_value(&row.expense.value);
    let url = expense_url(app_url, row);
    let body = format!(
        "# Olá, {name}!\n\n\
         Uma nova despesa no valor de **{value}** foi cadastrada na sua conta.\n\n\
         [Ver despesa]({url})\n",
        name = row.owner.name,
    );
    MailMessage {
        from,
        to: Address {
            email: row.owner.email.clone(),
            name: row.owner.name.clone(),
        },
        subject: SUBJECT.to_string(),
        body,
    }
}
