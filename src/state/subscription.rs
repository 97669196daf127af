use crate::api::ApiClient;
use crate::models::{
    MinutePackage, MinuteTransaction, MinutesBalance, Pagination, SubscriptionPlan,
    UserSubscription,
};
use crate::telegram::open_in_new_window;
use leptos::prelude::*;

pub(crate) const TRANSACTIONS_PAGE_SIZE: u32 = 20;

#[derive(Clone, Copy)]
pub(crate) struct SubscriptionStore {
    api: RwSignal<ApiClient>,
    pub plans: RwSignal<Vec<SubscriptionPlan>>,
    pub packages: RwSignal<Vec<MinutePackage>>,
    pub balance: RwSignal<Option<MinutesBalance>>,
    pub subscription: RwSignal<Option<UserSubscription>>,
    pub transactions: RwSignal<Vec<MinuteTransaction>>,
    pub transactions_pagination: RwSignal<Option<Pagination>>,

    pub loading_plans: RwSignal<bool>,
    pub loading_packages: RwSignal<bool>,
    pub loading_balance: RwSignal<bool>,
    pub loading_subscription: RwSignal<bool>,
    pub loading_transactions: RwSignal<bool>,
    pub activating_plan: RwSignal<bool>,
    pub purchasing_package: RwSignal<bool>,

    pub error: RwSignal<Option<String>>,
}

impl SubscriptionStore {
    pub fn new(api: RwSignal<ApiClient>) -> Self {
        Self {
            api,
            plans: RwSignal::new(vec![]),
            packages: RwSignal::new(vec![]),
            balance: RwSignal::new(None),
            subscription: RwSignal::new(None),
            transactions: RwSignal::new(vec![]),
            transactions_pagination: RwSignal::new(None),
            loading_plans: RwSignal::new(false),
            loading_packages: RwSignal::new(false),
            loading_balance: RwSignal::new(false),
            loading_subscription: RwSignal::new(false),
            loading_transactions: RwSignal::new(false),
            activating_plan: RwSignal::new(false),
            purchasing_package: RwSignal::new(false),
            error: RwSignal::new(None),
        }
    }

    pub async fn fetch_plans(self) {
        self.loading_plans.set(true);
        self.error.set(None);
        match self.api.get_untracked().get_plans().await {
            Ok(plans) => self.plans.set(plans),
            Err(e) => self.error.set(Some(e.to_string())),
        }
        self.loading_plans.set(false);
    }

    pub async fn fetch_packages(self) {
        self.loading_packages.set(true);
        self.error.set(None);
        match self.api.get_untracked().get_packages().await {
            Ok(packages) => self.packages.set(packages),
            Err(e) => self.error.set(Some(e.to_string())),
        }
        self.loading_packages.set(false);
    }

    pub async fn fetch_balance(self) {
        self.loading_balance.set(true);
        self.error.set(None);
        match self.api.get_untracked().get_balance().await {
            Ok(balance) => self.balance.set(Some(balance)),
            Err(e) => self.error.set(Some(e.to_string())),
        }
        self.loading_balance.set(false);
    }

    pub async fn fetch_subscription(self) {
        self.loading_subscription.set(true);
        self.error.set(None);
        match self.api.get_untracked().get_subscription().await {
            Ok(sub) => self.subscription.set(sub),
            Err(e) => self.error.set(Some(e.to_string())),
        }
        self.loading_subscription.set(false);
    }

    pub async fn fetch_transactions(self, page: u32) {
        self.loading_transactions.set(true);
        self.error.set(None);
        match self
            .api
            .get_untracked()
            .get_transactions(page, TRANSACTIONS_PAGE_SIZE)
            .await
        {
            Ok(res) => {
                self.transactions.set(res.transactions);
                self.transactions_pagination.set(Some(res.pagination));
            }
            Err(e) => self.error.set(Some(e.to_string())),
        }
        self.loading_transactions.set(false);
    }

    /// Paid plans hand off to the payment page; free plans apply at once.
    pub async fn activate_plan(self, plan_name: String) -> bool {
        self.activating_plan.set(true);
        self.error.set(None);
        let ok = match self.api.get_untracked().activate_plan(&plan_name).await {
            Ok(res) => {
                if let Some(url) = res.payment_redirect() {
                    tracing::info!("plan {} requires payment", plan_name);
                    open_in_new_window(url);
                } else {
                    self.fetch_balance().await;
                    self.fetch_subscription().await;
                }
                true
            }
            Err(e) => {
                self.error.set(Some(e.to_string()));
                false
            }
        };
        self.activating_plan.set(false);
        ok
    }

    pub async fn purchase_package(self, package_name: String) -> bool {
        self.purchasing_package.set(true);
        self.error.set(None);
        let ok = match self.api.get_untracked().purchase_package(&package_name).await {
            Ok(res) => {
                if let Some(url) = res.payment_redirect() {
                    open_in_new_window(url);
                } else {
                    self.fetch_balance().await;
                }
                true
            }
            Err(e) => {
                self.error.set(Some(e.to_string()));
                false
            }
        };
        self.purchasing_package.set(false);
        ok
    }

    pub fn clear_error(&self) {
        self.error.set(None);
    }

    pub fn reset(&self) {
        self.plans.set(vec![]);
        self.packages.set(vec![]);
        self.balance.set(None);
        self.subscription.set(None);
        self.transactions.set(vec![]);
        self.transactions_pagination.set(None);
        for flag in [
            self.loading_plans,
            self.loading_packages,
            self.loading_balance,
            self.loading_subscription,
            self.loading_transactions,
            self.activating_plan,
            self.purchasing_package,
        ] {
            flag.set(false);
        }
        self.error.set(None);
    }
}
