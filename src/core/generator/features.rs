//! Optional feature modules and their aggregation.
//!
//! Each enabled feature contributes fixed snippets to the generated project:
//! build file dependencies, manifest entries and code for the generated Java
//! classes. A [`FeatureManager`] folds all contributions into one aggregate;
//! the merge is append-only, so no feature can remove or override what
//! another contributed.

use std::collections::BTreeSet;

use crate::core::manifest::file_handler::FileHandler;
use crate::core::manifest::protocol::ProtocolHandler;
use crate::core::manifest::{AppsFlyerConfig, FallbackType, FirstRunFlagConfig, TwaManifest};

const ANDROID_BROWSER_HELPER: &str =
    "com.google.androidbrowserhelper:androidbrowserhelper:2.6.2";

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Metadata {
    pub name: String,
    pub value: String,
}

/// What one feature adds to the generated project.
#[derive(Clone, Debug, Default)]
pub struct Contribution {
    pub build_repositories: Vec<String>,
    pub build_dependencies: Vec<String>,
    pub build_configs: Vec<String>,
    pub manifest_permissions: Vec<String>,
    pub manifest_components: Vec<String>,
    pub application_metadata: Vec<Metadata>,
    pub launcher_activity_entries: Vec<String>,
    pub application_imports: Vec<String>,
    pub application_variables: Vec<String>,
    pub application_on_create: Option<String>,
    pub launcher_imports: Vec<String>,
    pub launcher_variables: Vec<String>,
    pub launcher_methods: Vec<String>,
    pub launcher_launch_url: Option<String>,
    pub delegation_imports: Vec<String>,
    pub delegation_on_create: Option<String>,
}

/// The feature modules this generator knows how to wire in.
pub enum Feature<'a> {
    LocationDelegation,
    AppsFlyer(&'a AppsFlyerConfig),
    FirstRunFlag(&'a FirstRunFlagConfig),
    ProtocolHandlers(&'a [ProtocolHandler]),
    FileHandling(&'a [FileHandler]),
}

impl Feature<'_> {
    pub fn contribution(&self) -> Contribution {
        match self {
            Feature::LocationDelegation => location_delegation(),
            Feature::AppsFlyer(config) => apps_flyer(config),
            Feature::FirstRunFlag(config) => first_run_flag(config),
            Feature::ProtocolHandlers(handlers) => protocol_handlers(handlers),
            Feature::FileHandling(handlers) => file_handling(handlers),
        }
    }
}

fn location_delegation() -> Contribution {
    Contribution {
        build_dependencies: vec![
            "com.google.androidbrowserhelper:locationdelegation:1.0.0".to_string(),
        ],
        manifest_components: vec![
            "<activity android:name=\
             \"com.google.androidbrowserhelper.locationdelegation.PermissionRequestActivity\"/>"
                .to_string(),
        ],
        delegation_imports: vec![
            "com.google.androidbrowserhelper.locationdelegation.LocationDelegationExtraCommandHandler"
                .to_string(),
        ],
        delegation_on_create: Some(
            "registerExtraCommandHandler(new LocationDelegationExtraCommandHandler());"
                .to_string(),
        ),
        ..Default::default()
    }
}

fn apps_flyer(config: &AppsFlyerConfig) -> Contribution {
    Contribution {
        build_repositories: vec!["mavenCentral()".to_string()],
        build_dependencies: vec!["com.appsflyer:af-android-sdk:5.4.0".to_string()],
        manifest_permissions: vec![
            "android.permission.INTERNET".to_string(),
            "android.permission.ACCESS_NETWORK_STATE".to_string(),
            "android.permission.ACCESS_WIFI_STATE".to_string(),
            "android.permission.READ_PHONE_STATE".to_string(),
        ],
        manifest_components: vec![r#"<receiver
            android:name="com.appsflyer.SingleInstallBroadcastReceiver"
            android:exported="true">
            <intent-filter>
                <action android:name="com.android.vending.INSTALL_REFERRER" />
            </intent-filter>
        </receiver>"#
            .to_string()],
        application_imports: vec![
            "java.util.Map".to_string(),
            "com.appsflyer.AppsFlyerLib".to_string(),
            "com.appsflyer.AppsFlyerConversionListener".to_string(),
        ],
        application_variables: vec![format!(
            "private static final String AF_DEV_KEY = \"{}\";",
            config.apps_flyer_id
        )],
        application_on_create: Some(
            r#"AppsFlyerConversionListener conversionListener = new AppsFlyerConversionListener() {
            @Override
            public void onConversionDataSuccess(Map<String, Object> conversionData) {
            }

            @Override
            public void onConversionDataFail(String errorMessage) {
            }

            @Override
            public void onAppOpenAttribution(Map<String, String> attributionData) {
            }

            @Override
            public void onAttributionFailure(String errorMessage) {
            }
        };
        AppsFlyerLib.getInstance().init(AF_DEV_KEY, conversionListener, this);
        AppsFlyerLib.getInstance().startTracking(this);"#
                .to_string(),
        ),
        launcher_imports: vec!["com.appsflyer.AppsFlyerLib".to_string()],
        launcher_launch_url: Some(
            r#"String appsFlyerId = AppsFlyerLib.getInstance().getAppsFlyerUID(this);
        uri = uri
                .buildUpon()
                .appendQueryParameter("appsflyer_id", appsFlyerId)
                .build();"#
                .to_string(),
        ),
        ..Default::default()
    }
}

fn first_run_flag(config: &FirstRunFlagConfig) -> Contribution {
    Contribution {
        launcher_imports: vec![
            "android.content.SharedPreferences".to_string(),
            "android.os.StrictMode".to_string(),
        ],
        launcher_variables: vec![
            "private static final String KEY_FIRST_OPEN = \"twa_wrap.first_open\";".to_string(),
            format!(
                "private static final String PARAM_FIRST_OPEN = \"{}\";",
                config.query_parameter_name
            ),
        ],
        launcher_methods: vec![r#"private boolean checkAndMarkFirstOpen() {
        StrictMode.ThreadPolicy originalPolicy = StrictMode.allowThreadDiskReads();
        try {
            SharedPreferences preferences = getPreferences(MODE_PRIVATE);
            boolean isFirstRun = preferences.getBoolean(KEY_FIRST_OPEN, true);
            preferences.edit().putBoolean(KEY_FIRST_OPEN, false).apply();
            return isFirstRun;
        } finally {
            StrictMode.setThreadPolicy(originalPolicy);
        }
    }"#
        .to_string()],
        launcher_launch_url: Some(
            r#"uri = uri
                .buildUpon()
                .appendQueryParameter(PARAM_FIRST_OPEN, String.valueOf(checkAndMarkFirstOpen()))
                .build();"#
                .to_string(),
        ),
        ..Default::default()
    }
}

fn protocol_handlers(handlers: &[ProtocolHandler]) -> Contribution {
    if handlers.is_empty() {
        return Contribution::default();
    }

    let launcher_activity_entries = handlers
        .iter()
        .map(|handler| {
            format!(
                r#"<intent-filter>
                <action android:name="android.intent.action.VIEW"/>
                <category android:name="android.intent.category.DEFAULT" />
                <category android:name="android.intent.category.BROWSABLE"/>
                <data android:scheme="{}" />
            </intent-filter>"#,
                handler.protocol
            )
        })
        .collect();

    let map_entries = handlers
        .iter()
        .map(|handler| {
            format!(
                "registry.put(\"{}\", Uri.parse(\"{}\"));",
                handler.protocol, handler.url
            )
        })
        .collect::<Vec<_>>()
        .join("\n        ");

    Contribution {
        launcher_activity_entries,
        launcher_imports: vec!["java.util.HashMap".to_string(), "java.util.Map".to_string()],
        launcher_methods: vec![format!(
            r#"@Override
    protected Map<String, Uri> getProtocolHandlers() {{
        Map<String, Uri> registry = new HashMap<>();
        {map_entries}
        return registry;
    }}"#
        )],
        ..Default::default()
    }
}

fn file_handling(handlers: &[FileHandler]) -> Contribution {
    let mut contribution = Contribution::default();
    for (i, handler) in handlers.iter().enumerate() {
        let mime_data = handler
            .mime_types
            .iter()
            .map(|mime_type| format!("\n            <data android:mimeType=\"{mime_type}\" />"))
            .collect::<String>();
        contribution.manifest_components.push(format!(
            r#"<activity-alias
            android:name="FileHandlingActivity{i}"
            android:targetActivity="LauncherActivity"
            android:exported="true">
            <meta-data android:name="android.support.customtabs.trusted.FILE_HANDLING_ACTION_URL"
                android:value="@string/fileHandlingActionUrl{i}" />
            <intent-filter>
                <action android:name="android.intent.action.VIEW"/>
                <category android:name="android.intent.category.DEFAULT" />
                <category android:name="android.intent.category.BROWSABLE"/>
                <data android:scheme="content" />{mime_data}
            </intent-filter>
        </activity-alias>"#
        ));
        contribution.build_configs.push(format!(
            "resValue \"string\", \"fileHandlingActionUrl{i}\", \"{}\"",
            handler.action_url
        ));
    }
    contribution
}

/// The aggregate of every enabled feature's contributions.
///
/// Sets deduplicate (two features asking for the same permission yield one
/// entry) and iterate in sorted order, which keeps regeneration
/// byte-identical. Snippet lists keep insertion order for readability of the
/// generated source.
#[derive(Debug, Default)]
pub struct FeatureManager {
    pub build_repositories: BTreeSet<String>,
    pub build_dependencies: BTreeSet<String>,
    pub build_configs: BTreeSet<String>,
    pub manifest_permissions: BTreeSet<String>,
    pub manifest_components: Vec<String>,
    pub application_metadata: Vec<Metadata>,
    pub launcher_activity_entries: Vec<String>,
    pub application_imports: BTreeSet<String>,
    pub application_variables: Vec<String>,
    pub application_on_create: Vec<String>,
    pub launcher_imports: BTreeSet<String>,
    pub launcher_variables: BTreeSet<String>,
    pub launcher_methods: BTreeSet<String>,
    pub launcher_launch_url: Vec<String>,
    pub delegation_imports: BTreeSet<String>,
    pub delegation_on_create: Vec<String>,
}

impl FeatureManager {
    /// Collects the enabled features of a manifest into one aggregate.
    pub fn new(manifest: &TwaManifest) -> Self {
        let mut aggregate = Self::default();

        if let Some(config) = &manifest.features.location_delegation {
            if config.enabled {
                aggregate.add(Feature::LocationDelegation);
            }
        }

        if let Some(config) = &manifest.features.apps_flyer {
            if config.enabled {
                aggregate.add(Feature::AppsFlyer(config));
            }
        }

        if let Some(config) = &manifest.features.first_run_flag {
            if config.enabled {
                aggregate.add(Feature::FirstRunFlag(config));
            }
        }

        if !manifest.protocol_handlers.is_empty() {
            aggregate.add(Feature::ProtocolHandlers(&manifest.protocol_handlers));
        }

        if !manifest.file_handlers.is_empty() {
            aggregate.add(Feature::FileHandling(&manifest.file_handlers));
        }

        // The WebView fallback needs the INTERNET permission.
        if manifest.fallback_type == FallbackType::Webview {
            aggregate
                .manifest_permissions
                .insert("android.permission.INTERNET".to_string());
        }

        // Android T+ needs permission to request sending notifications.
        if manifest.enable_notifications {
            aggregate
                .manifest_permissions
                .insert("android.permission.POST_NOTIFICATIONS".to_string());
        }

        aggregate
            .build_dependencies
            .insert(ANDROID_BROWSER_HELPER.to_string());

        aggregate
    }

    fn add(&mut self, feature: Feature<'_>) {
        let c = feature.contribution();
        self.build_repositories.extend(c.build_repositories);
        self.build_dependencies.extend(c.build_dependencies);
        self.build_configs.extend(c.build_configs);
        self.manifest_permissions.extend(c.manifest_permissions);
        self.manifest_components.extend(c.manifest_components);
        self.application_metadata.extend(c.application_metadata);
        self.launcher_activity_entries
            .extend(c.launcher_activity_entries);
        self.application_imports.extend(c.application_imports);
        self.application_variables.extend(c.application_variables);
        self.application_on_create.extend(c.application_on_create);
        self.launcher_imports.extend(c.launcher_imports);
        self.launcher_variables.extend(c.launcher_variables);
        self.launcher_methods.extend(c.launcher_methods);
        self.launcher_launch_url.extend(c.launcher_launch_url);
        self.delegation_imports.extend(c.delegation_imports);
        self.delegation_on_create.extend(c.delegation_on_create);
    }

    /// The feature-derived fields consumed by the templated files.
    pub fn template_fields(&self) -> Vec<(&'static str, String)> {
        fn lines<'a>(items: impl Iterator<Item = &'a String>) -> String {
            items.cloned().collect::<Vec<_>>().join("\n")
        }
        fn imports<'a>(items: impl Iterator<Item = &'a String>) -> String {
            items
                .map(|import| format!("import {import};"))
                .collect::<Vec<_>>()
                .join("\n")
        }

        let permissions = self
            .manifest_permissions
            .iter()
            .map(|permission| format!("<uses-permission android:name=\"{permission}\" />"))
            .collect::<Vec<_>>()
            .join("\n    ");

        let metadata = self
            .application_metadata
            .iter()
            .map(|m| {
                format!(
                    "<meta-data android:name=\"{}\" android:value=\"{}\" />",
                    m.name, m.value
                )
            })
            .collect::<Vec<_>>()
            .join("\n        ");

        let dependencies = self
            .build_dependencies
            .iter()
            .map(|dependency| format!("implementation '{dependency}'"))
            .collect::<Vec<_>>()
            .join("\n    ");

        vec![
            ("buildRepositories", lines(self.build_repositories.iter())),
            ("buildDependencies", dependencies),
            ("buildConfigs", lines(self.build_configs.iter())),
            ("manifestPermissions", permissions),
            ("manifestComponents", lines(self.manifest_components.iter())),
            ("applicationMetadata", metadata),
            (
                "launcherActivityEntries",
                lines(self.launcher_activity_entries.iter()),
            ),
            ("applicationImports", imports(self.application_imports.iter())),
            (
                "applicationVariables",
                lines(self.application_variables.iter()),
            ),
            ("applicationOnCreate", lines(self.application_on_create.iter())),
            ("launcherImports", imports(self.launcher_imports.iter())),
            ("launcherVariables", lines(self.launcher_variables.iter())),
            ("launcherMethods", lines(self.launcher_methods.iter())),
            ("launchUrlSnippets", lines(self.launcher_launch_url.iter())),
            ("delegationImports", imports(self.delegation_imports.iter())),
            (
                "delegationOnCreate",
                lines(self.delegation_on_create.iter()),
            ),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::manifest::{Features, LocationDelegationConfig};

    #[test]
    fn always_adds_the_browser_helper_dependency() {
        let aggregate = FeatureManager::new(&TwaManifest::default());
        assert!(aggregate
            .build_dependencies
            .contains(ANDROID_BROWSER_HELPER));
    }

    #[test]
    fn webview_fallback_adds_the_internet_permission() {
        let manifest = TwaManifest {
            fallback_type: FallbackType::Webview,
            ..Default::default()
        };
        let aggregate = FeatureManager::new(&manifest);
        assert!(aggregate
            .manifest_permissions
            .contains("android.permission.INTERNET"));

        let default_aggregate = FeatureManager::new(&TwaManifest::default());
        assert!(default_aggregate.manifest_permissions.is_empty());
    }

    #[test]
    fn notifications_add_the_post_notifications_permission() {
        let manifest = TwaManifest {
            enable_notifications: true,
            ..Default::default()
        };
        let aggregate = FeatureManager::new(&manifest);
        assert!(aggregate
            .manifest_permissions
            .contains("android.permission.POST_NOTIFICATIONS"));
    }

    #[test]
    fn permissions_are_deduplicated_across_features() {
        // AppsFlyer contributes INTERNET; so does the WebView fallback.
        let manifest = TwaManifest {
            fallback_type: FallbackType::Webview,
            features: Features {
                apps_flyer: Some(AppsFlyerConfig {
                    enabled: true,
                    apps_flyer_id: "12345".to_string(),
                }),
                ..Default::default()
            },
            ..Default::default()
        };
        let aggregate = FeatureManager::new(&manifest);
        let internet = aggregate
            .manifest_permissions
            .iter()
            .filter(|p| *p == "android.permission.INTERNET")
            .count();
        assert_eq!(internet, 1);
    }

    #[test]
    fn disabled_features_contribute_nothing() {
        let manifest = TwaManifest {
            features: Features {
                location_delegation: Some(LocationDelegationConfig { enabled: false }),
                ..Default::default()
            },
            ..Default::default()
        };
        let aggregate = FeatureManager::new(&manifest);
        assert!(aggregate.delegation_on_create.is_empty());
    }

    #[test]
    fn protocol_handlers_contribute_intent_filters_and_a_registry() {
        let manifest = TwaManifest {
            protocol_handlers: vec![ProtocolHandler {
                protocol: "web+coffee".to_string(),
                url: "https://example.com/?drink=%s".to_string(),
            }],
            ..Default::default()
        };
        let aggregate = FeatureManager::new(&manifest);
        assert_eq!(aggregate.launcher_activity_entries.len(), 1);
        assert!(aggregate.launcher_activity_entries[0].contains("android:scheme=\"web+coffee\""));
        let methods = aggregate.launcher_methods.iter().next().unwrap();
        assert!(methods.contains("getProtocolHandlers"));
        assert!(methods.contains("registry.put(\"web+coffee\""));
    }

    #[test]
    fn file_handlers_contribute_aliases_and_res_values() {
        let manifest = TwaManifest {
            file_handlers: vec![FileHandler {
                action_url: "https://example.com/open".to_string(),
                mime_types: vec!["image/png".to_string(), "image/jpeg".to_string()],
            }],
            ..Default::default()
        };
        let aggregate = FeatureManager::new(&manifest);
        assert_eq!(aggregate.manifest_components.len(), 1);
        assert!(aggregate.manifest_components[0].contains("FileHandlingActivity0"));
        assert!(aggregate.manifest_components[0].contains("image/png"));
        assert!(aggregate
            .build_configs
            .contains("resValue \"string\", \"fileHandlingActionUrl0\", \"https://example.com/open\""));
    }

    #[test]
    fn location_delegation_wires_the_delegation_service() {
        let manifest = TwaManifest {
            features: Features {
                location_delegation: Some(LocationDelegationConfig { enabled: true }),
                ..Default::default()
            },
            ..Default::default()
        };
        let aggregate = FeatureManager::new(&manifest);
        assert!(aggregate
            .build_dependencies
            .contains("com.google.androidbrowserhelper:locationdelegation:1.0.0"));
        assert_eq!(aggregate.delegation_on_create.len(), 1);
    }

    #[test]
    fn template_fields_render_blocks() {
        let manifest = TwaManifest {
            enable_notifications: true,
            ..Default::default()
        };
        let aggregate = FeatureManager::new(&manifest);
        let fields = aggregate.template_fields();
        let permissions = &fields
            .iter()
            .find(|(name, _)| *name == "manifestPermissions")
            .unwrap()
            .1;
        assert_eq!(
            permissions,
            "<uses-permission android:name=\"android.permission.POST_NOTIFICATIONS\" />"
        );
    }
}
