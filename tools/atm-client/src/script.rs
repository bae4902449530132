//! Parsing of `script` steps: `deposit:100`, `withdraw:50`, `balance`, `view_log`.

use shared_types::{AccountRequest, Action, Amount};

/// Parse one step into a request.
pub fn parse_step(step: &str) -> Result<AccountRequest, String> {
    let (name, amount) = match step.split_once(':') {
        Some((name, amount)) => (name, Some(amount)),
        None => (step, None),
    };

    let action = Action::from_wire(&name.trim().replace('-', "_"));
    if let Action::Unrecognized(other) = &action {
        return Err(format!("unknown action '{other}'"));
    }

    let amount = match (action.requires_amount(), amount) {
        (true, Some(raw)) => Some(
            raw.trim()
                .parse::<Amount>()
                .map_err(|_| format!("invalid amount '{raw}' in '{step}'"))?,
        ),
        (true, None) => return Err(format!("'{step}' needs an amount, e.g. {name}:100")),
        (false, Some(_)) => return Err(format!("'{name}' takes no amount")),
        (false, None) => None,
    };
    Ok(AccountRequest::new(action, amount))
}
