use contracts::shared::lang::Lang;
use contracts::system::auth::UserInfo;
use leptos::prelude::*;
use leptos::task::spawn_local;

use super::api;
use crate::shared::api_client::ApiClient;

#[derive(Clone, Debug, Default)]
pub struct AuthState {
    pub user_info: Option<UserInfo>,
    pub loading: bool,
}

/// Shared application state: the HTTP client (with its session), the
/// signed-in user and the display language.
#[derive(Clone, Copy)]
pub struct AppContext {
    pub client: StoredValue<ApiClient>,
    pub auth: RwSignal<AuthState>,
    pub lang: RwSignal<Lang>,
}

impl AppContext {
    pub fn client(&self) -> ApiClient {
        self.client.get_value()
    }
}

/// Auth context provider component
#[component]
pub fn AuthProvider(client: ApiClient, default_lang: Lang, children: ChildrenFn) -> impl IntoView {
    let ctx = AppContext {
        client: StoredValue::new(client),
        auth: RwSignal::new(AuthState {
            user_info: None,
            loading: true,
        }),
        lang: RwSignal::new(default_lang),
    };

    // Resolve who the token belongs to. A rejected token never comes back
    // here: the client redirects to the login page.
    Effect::new(move |_| {
        let client = ctx.client();
        spawn_local(async move {
            match api::get_current_user(&client).await {
                Ok(user_info) => {
                    log::info!(
                        "Signed in as {} ({})",
                        user_info.username,
                        user_info.role.as_str()
                    );
                    ctx.auth.set(AuthState {
                        user_info: Some(user_info),
                        loading: false,
                    });
                }
                Err(err) => {
                    log::error!("Failed to load current user: {}", err);
                    ctx.auth.set(AuthState {
                        user_info: None,
                        loading: false,
                    });
                }
            }
        });
    });

    provide_context(ctx);

    children()
}

/// Hook to access the application context
pub fn use_app() -> AppContext {
    use_context::<AppContext>().expect("AuthProvider not found in component tree")
}

/// Helper: may the signed-in user change responses and evidence?
pub fn can_edit_responses() -> Signal<bool> {
    let ctx = use_app();
    Signal::derive(move || {
        ctx.auth.with(|state| {
            state
                .user_info
                .as_ref()
                .map(|u| u.role.can_edit_responses())
                .unwrap_or(false)
        })
    })
}
