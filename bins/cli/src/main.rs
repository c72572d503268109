//! Petty cash desk walkthrough.
//!
//! Seeds an in-memory chart of accounts, runs one advance through approval,
//! payout, settlement and return, then prints the requests and the ledger as
//! JSON.
//!
//! Usage: cargo run --bin pettycash

use chrono::Utc;
use rust_decimal::Decimal;
use serde_json::json;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pettycash_core::ledger::{AccountType, DocumentInput, EntryKind, JournalKind, MemoryLedger};
use pettycash_core::petty_cash::{NewRequest, OperationSuggestion, PettyCashDesk, Requester};
use pettycash_core::settlement::{Product, Settlement};
use pettycash_shared::AppConfig;
use pettycash_shared::types::{AccountId, JournalId, PartnerId, ProductId};

/// Accounts and journals of the demo chart.
struct Chart {
    bank: AccountId,
    payable: AccountId,
    office: AccountId,
    travel: AccountId,
    bank_journal: JournalId,
    purchase_journal: JournalId,
    employee: PartnerId,
    vendor: PartnerId,
}

fn seed(ledger: &mut MemoryLedger, config: &AppConfig) -> Chart {
    let petty = ledger.add_account("103000", "Petty Cash", AccountType::Cash, true);
    let petty_suspense =
        ledger.add_account("103900", "Petty Cash Suspense", AccountType::Suspense, true);
    ledger.add_account(
        &config.petty_cash.suspense_account_code,
        "Bank Suspense",
        AccountType::Suspense,
        false,
    );
    let bank = ledger.add_account("101000", "Bank", AccountType::Cash, false);
    let payable = ledger.add_account("211000", "Account Payable", AccountType::Payable, true);
    let office = ledger.add_account("611000", "Office Supplies", AccountType::Expense, false);
    let travel = ledger.add_account("612000", "Travel", AccountType::Expense, false);

    ledger.add_journal(
        &config.petty_cash.journal_code,
        "Petty Cash",
        JournalKind::Cash,
        Some(petty),
        Some(petty_suspense),
    );
    let bank_journal = ledger.add_journal("BNK1", "Bank", JournalKind::Bank, Some(bank), None);
    let purchase_journal =
        ledger.add_journal("BILL", "Vendor Bills", JournalKind::Purchase, None, None);

    Chart {
        bank,
        payable,
        office,
        travel,
        bank_journal,
        purchase_journal,
        employee: ledger.add_partner("Mitchell Admin"),
        vendor: ledger.add_partner("Office Depot"),
    }
}

fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.filter.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut ledger = MemoryLedger::new();
    let chart = seed(&mut ledger, &config);
    let mut desk = PettyCashDesk::new(ledger, &config.petty_cash);

    let id = desk.create(NewRequest {
        narration: "Office supplies and taxi".to_string(),
        amount: Decimal::new(1000, 0),
        requester: Some(Requester::Partner {
            partner: chart.employee,
        }),
        ..NewRequest::default()
    });
    desk.approve(id)?;
    desk.set_operation_journal(id, Some(chart.bank_journal))?;
    if let OperationSuggestion::Pay { amount } = desk.suggest_operation(id)? {
        desk.pay(id, chart.bank, amount)?;
    }

    let bill = desk.ledger_mut().record_document(DocumentInput {
        journal: chart.purchase_journal,
        kind: EntryKind::VendorBill,
        name: "BILL/0001".to_string(),
        partner: chart.vendor,
        date: Utc::now().date_naive(),
        expense_account: chart.office,
        payable_account: chart.payable,
        amount: Decimal::new(400, 0),
    })?;
    let settlement = desk.bill_settlement(bill)?;
    desk.attach_settlement(id, settlement)?;

    let taxi = Product {
        id: ProductId::new(),
        name: "Taxi fare".to_string(),
        standard_price: Decimal::new(150, 0),
        expense_account: Some(chart.travel),
    };
    desk.attach_settlement(id, Settlement::from_product(&taxi, None))?;

    let report = desk.confirm_settlements(id)?;
    info!(entries = report.entries.len(), "settlements confirmed");

    if let OperationSuggestion::Return { amount } = desk.suggest_operation(id)? {
        desk.return_remaining(id, chart.bank, amount)?;
    }

    let request = desk.request(id)?;
    info!(
        request = %request.name,
        state = %request.state,
        settled = %request.settlement_amount(),
        "walkthrough complete"
    );

    let entries: Vec<_> = desk.ledger().entries().collect();
    let output = json!({
        "requests": desk.requests(),
        "entries": entries,
        "reconciliations": desk.ledger().reconciliations(),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}
